//! Model Resolver and fallback chain: spec §4.2.
//!
//! The router never calls a backend itself — it asks the host to resolve a
//! [`ModelRef`] against the host's own credential/config state and hands
//! back a concrete [`ResolvedModel`]. This mirrors the teacher's
//! `BackendClient` in spirit (one call surface hiding provider differences)
//! but as a host-provided trait, since transport is explicitly out of scope.

use async_trait::async_trait;

use crate::config::ModelRef;
use crate::provider::Provider;

/// A model reference the host has confirmed is usable: provider, id, and an
/// opaque credentials handle the host understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub provider: Provider,
    pub id: String,
}

impl ResolvedModel {
    pub fn new(provider: Provider, id: impl Into<String>) -> Self {
        Self { provider, id: id.into() }
    }
}

/// The host's model-resolution boundary contract (spec §6). Implementors
/// decide whether a `(provider, id)` pair is actually usable right now —
/// e.g. whether the backend is reachable or a credential is configured.
#[async_trait]
pub trait ModelResolver: Send + Sync {
    async fn resolve(&self, model_ref: &ModelRef) -> Option<ResolvedModel>;
}

/// Resolves every `ModelRef` to itself, unconditionally. Useful for tests and
/// for hosts with no additional resolution logic beyond config parsing.
#[derive(Debug, Default)]
pub struct StaticModelResolver;

/// Production resolver: always resolves local (`Ollama`) references, and
/// resolves a cloud reference only when a credential for its provider is
/// present in the process environment (spec §4.7's env-var table).
///
/// Only environment variables are consulted here — configured auth profiles
/// and the agent-local OAuth file are consulted later, by
/// [`crate::credentials::CredentialResolver`], once the Decision Engine has
/// already picked a target and needs the actual key value rather than a
/// yes/no on presence.
#[derive(Debug, Default)]
pub struct EnvModelResolver;

#[async_trait]
impl ModelResolver for EnvModelResolver {
    async fn resolve(&self, model_ref: &ModelRef) -> Option<ResolvedModel> {
        if !model_ref.provider.is_cloud() {
            return Some(ResolvedModel::new(model_ref.provider, model_ref.id.clone()));
        }

        let has_credential = model_ref
            .provider
            .env_var()
            .and_then(|var| std::env::var(var).ok())
            .or_else(|| {
                model_ref.provider.oauth_env_var().and_then(|var| std::env::var(var).ok())
            })
            .is_some();

        if has_credential {
            Some(ResolvedModel::new(model_ref.provider, model_ref.id.clone()))
        } else {
            tracing::warn!(
                provider = %model_ref.provider,
                id = %model_ref.id,
                "no environment credential found while resolving cloud model"
            );
            None
        }
    }
}

#[async_trait]
impl ModelResolver for StaticModelResolver {
    async fn resolve(&self, model_ref: &ModelRef) -> Option<ResolvedModel> {
        Some(ResolvedModel::new(model_ref.provider, model_ref.id.clone()))
    }
}

/// The three resolved model slots, frozen for the wrapper's lifetime
/// (spec §3 "Lifecycles"). `local` is always present — `Router::new` refuses
/// to install without it (spec §4.2).
#[derive(Debug, Clone)]
pub struct ResolvedModels {
    pub local: ResolvedModel,
    pub local_text: Option<ResolvedModel>,
    pub cloud: Option<ResolvedModel>,
}

impl ResolvedModels {
    /// Resolve all three configured model references via `resolver`.
    ///
    /// Returns `Err` only when the mandatory local model fails to resolve;
    /// `local_text`/`cloud` resolution failures are logged and leave that
    /// slot `None`, per spec §4.2.
    pub async fn resolve(
        resolver: &dyn ModelResolver,
        local_model: &ModelRef,
        local_text_model: Option<&ModelRef>,
        cloud_model: Option<&ModelRef>,
    ) -> Result<Self, crate::error::RouterError> {
        let local = resolver.resolve(local_model).await.ok_or_else(|| {
            crate::error::RouterError::LocalModelMissing {
                provider: local_model.provider.to_string(),
                id: local_model.id.clone(),
            }
        })?;

        let local_text = match local_text_model {
            Some(m) => resolver.resolve(m).await.or_else(|| {
                tracing::warn!(
                    provider = %m.provider,
                    id = %m.id,
                    "local text model could not be resolved, continuing without it"
                );
                None
            }),
            None => None,
        };

        let cloud = match cloud_model {
            Some(m) => resolver.resolve(m).await.or_else(|| {
                tracing::warn!(
                    provider = %m.provider,
                    id = %m.id,
                    "cloud model could not be resolved, continuing without it"
                );
                None
            }),
            None => None,
        };

        Ok(Self { local, local_text, cloud })
    }

    /// True iff a cloud model is resolved and a credential is known for its
    /// provider (spec §4.4 `cloudAvailable`). Credential presence is the
    /// caller's concern — see [`crate::credentials::CredentialResolver`].
    pub fn cloud_available(&self, has_credential: bool) -> bool {
        self.cloud.is_some() && has_credential
    }

    /// spec §4.2 degradation chain when the Decision Engine's preferred
    /// target has no model: `cloud → local-text → local`.
    pub fn best_available_after_cloud(&self) -> &ResolvedModel {
        self.local_text.as_ref().unwrap_or(&self.local)
    }
}
