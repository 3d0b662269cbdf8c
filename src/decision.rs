//! Decision Engine: spec §4.4, including the Cloud Session Affinity
//! invariant (§4.4/§8, resolved here via option (a) — see `DESIGN.md`).

use crate::classifier::Classification;
use crate::config::{OnCloudUnavailable, Preference, RouterConfig};
use crate::context::Context;
use crate::error::{Result, RouterError};
use crate::models::{ResolvedModel, ResolvedModels};
use crate::provider::Provider;

/// Which backend a call is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Local,
    LocalText,
    Cloud,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Local => "local",
            Target::LocalText => "local-text",
            Target::Cloud => "cloud",
        }
    }
}

/// The outcome of [`decide`]: chosen target, the model behind it, and the
/// classifier output that drove the choice (spec §3 `Decision`).
#[derive(Debug, Clone)]
pub struct Decision {
    pub target: Target,
    pub model: ResolvedModel,
    pub score: f64,
    pub reason: String,
    pub tags: Vec<String>,
}

const CLOUD_CAPABILITY_TAGS: [&str; 4] = ["search", "recommendation", "real-time", "shopping"];

const TOOL_LIKE_TAGS: [&str; 6] =
    ["file-read", "directory", "command", "tool-heavy-ctx", "post-tool", "confirmation"];

/// True iff the most recent assistant message was produced by a recognised
/// cloud provider. Used for the cloud-session-affinity rule ahead of the
/// generic post-tool-turn shortcut.
fn last_turn_was_cloud_authored(context: &Context) -> bool {
    context
        .last_assistant_message()
        .and_then(|m| m.provider.as_deref())
        .and_then(|p| p.parse::<Provider>().ok())
        .map(Provider::is_cloud)
        .unwrap_or(false)
}

fn local_text_or_local(models: &ResolvedModels) -> (Target, ResolvedModel) {
    match &models.local_text {
        Some(m) => (Target::LocalText, m.clone()),
        None => (Target::Local, models.local.clone()),
    }
}

/// Degrade away from `cloud` per `cfg.fallback.on_cloud_unavailable` (spec
/// §3 `fallback.onCloudUnavailable ∈ { local-text, local, error }`). `reason`
/// names the rule that wanted cloud, for the `error` variant's message.
fn degrade_cloud_unavailable(
    cfg: &RouterConfig,
    models: &ResolvedModels,
    reason: &str,
) -> Result<(Target, ResolvedModel)> {
    match cfg.fallback.on_cloud_unavailable {
        OnCloudUnavailable::LocalText => Ok(local_text_or_local(models)),
        OnCloudUnavailable::Local => Ok((Target::Local, models.local.clone())),
        OnCloudUnavailable::Error => Err(RouterError::CloudUnavailable(reason.to_owned())),
    }
}

/// Resolve a [`Decision`] for `context`. `classification` is the classifier's
/// output for the same context; `cloud_available` must already fold in
/// credential presence (spec §4.4 `cloudAvailable = models.cloud != null &&
/// credential(cloudModel.provider)`).
///
/// Returns `Err` only when a rule wants to degrade off cloud and
/// `cfg.fallback.on_cloud_unavailable` is `error` (spec §3, §7) — every
/// other path always produces a `Decision`, since `localModel` is mandatory.
pub fn decide(
    context: &Context,
    cfg: &RouterConfig,
    models: &ResolvedModels,
    classification: &Classification,
    cloud_available: bool,
) -> Result<Decision> {
    let score = classification.score;
    let tags = classification.tags.clone();

    let finish = |target: Target, model: ResolvedModel, reason: &str| Decision {
        target,
        model,
        score,
        reason: reason.to_owned(),
        tags: tags.clone(),
    };

    // 1. local-only overrides everything.
    if cfg.preference == Preference::LocalOnly {
        return Ok(finish(Target::Local, models.local.clone(), "preference-local-only"));
    }

    // 2. cloud-only: use cloud if available, else warn and fall back to local.
    // This is the spec's own explicit override (§4.4 step 2), not the
    // general cloud-unavailable degradation chain, so it always lands on
    // `local` regardless of `fallback.on_cloud_unavailable`.
    if cfg.preference == Preference::CloudOnly {
        return Ok(if cloud_available {
            finish(Target::Cloud, models.cloud.clone().unwrap(), "preference-cloud-only")
        } else {
            tracing::warn!("preference is cloud-only but no cloud credential is available");
            finish(Target::Local, models.local.clone(), "preference-cloud-only-unavailable")
        });
    }

    // 3. Cloud session affinity, checked ahead of the generic shortcut
    // handling in step 4 (DESIGN.md option (a)).
    if context.last_message_is_tool_result() && last_turn_was_cloud_authored(context) {
        if cloud_available {
            return Ok(finish(Target::Cloud, models.cloud.clone().unwrap(), "cloud-session-affinity"));
        }
        let (target, model) = degrade_cloud_unavailable(cfg, models, "cloud-session-affinity")?;
        return Ok(finish(target, model, "cloud-session-affinity-unavailable"));
    }

    // 3 (cont'd). force-cloud shortcut.
    if classification.reason == "force-cloud" {
        return Ok(if cloud_available {
            finish(Target::Cloud, models.cloud.clone().unwrap(), "force-cloud")
        } else {
            let (target, model) = degrade_cloud_unavailable(cfg, models, "force-cloud")?;
            finish(target, model, "force-cloud-unavailable")
        });
    }

    // 4. force-local / post-tool-turn.
    if classification.reason == "force-local" || classification.reason == "post-tool-turn" {
        return Ok(finish(Target::Local, models.local.clone(), classification.reason));
    }

    // 5. Cloud-capability gate.
    let needs_cloud_capability = tags.iter().any(|t| CLOUD_CAPABILITY_TAGS.contains(&t.as_str()));
    if needs_cloud_capability && cloud_available && cfg.preference != Preference::LocalOnly {
        return Ok(finish(Target::Cloud, models.cloud.clone().unwrap(), "cloud-capability-gate"));
    }

    // 6. Score at/above threshold.
    if score >= cfg.routing.complexity_threshold {
        return Ok(match cfg.preference {
            Preference::PreferLocal => {
                if score < 0.7 && models.local_text.is_some() {
                    finish(
                        Target::LocalText,
                        models.local_text.clone().unwrap(),
                        "prefer-local-moderate-score",
                    )
                } else if cloud_available {
                    finish(Target::Cloud, models.cloud.clone().unwrap(), "prefer-local-escalate")
                } else {
                    let (target, model) =
                        degrade_cloud_unavailable(cfg, models, "prefer-local-escalate")?;
                    finish(target, model, "prefer-local-escalate-unavailable")
                }
            }
            _ => {
                if cloud_available {
                    finish(Target::Cloud, models.cloud.clone().unwrap(), "prefer-cloud-escalate")
                } else {
                    let (target, model) =
                        degrade_cloud_unavailable(cfg, models, "prefer-cloud-escalate")?;
                    finish(target, model, "prefer-cloud-escalate-unavailable")
                }
            }
        });
    }

    // 7. Simple task.
    let is_tool_like = tags.iter().any(|t| TOOL_LIKE_TAGS.contains(&t.as_str()));
    if is_tool_like {
        return Ok(finish(Target::Local, models.local.clone(), "simple-tool-like"));
    }
    if cfg.preference == Preference::PreferCloud && cloud_available {
        return Ok(finish(Target::Cloud, models.cloud.clone().unwrap(), "simple-prefer-cloud"));
    }
    // "Simple" tasks without a tool-like tag never needed cloud in the first
    // place, so falling back to local-text/local here is the ordinary
    // default path, not a cloud-unavailable degradation — it applies
    // unconditionally rather than through `fallback.on_cloud_unavailable`.
    let (target, model) = local_text_or_local(models);
    Ok(finish(target, model, "simple-default"))
}
