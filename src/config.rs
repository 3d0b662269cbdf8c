//! Router configuration: spec §3 `RouterConfig` and §4.1 Config Resolver.
//!
//! Parsed once at startup from the host's config tree and frozen for the
//! wrapper's lifetime (spec §5). The router consumes only its own `router.*`
//! subtree plus the top-level `auth.profiles` map (spec §6); everything else
//! in the host's config document is ignored.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::provider::Provider;

/// Identifies a backend: which provider, which model id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelRef {
    pub provider: Provider,
    pub id: String,
}

impl ModelRef {
    pub fn new(provider: Provider, id: impl Into<String>) -> Self {
        Self { provider, id: id.into() }
    }
}

/// Global dispatch bias (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    #[default]
    PreferLocal,
    PreferCloud,
    LocalOnly,
    CloudOnly,
}

/// Degradation policy when the cloud backend is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnCloudUnavailable {
    #[default]
    LocalText,
    Local,
    Error,
}

/// Degradation policy when a local call errors out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnLocalError {
    #[default]
    Cloud,
    Error,
}

fn default_threshold() -> f64 {
    0.5
}

fn default_max_local_tokens() -> u32 {
    1024
}

/// Routing-specific knobs (spec §3 `routing.*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutingConfig {
    #[serde(default = "default_threshold")]
    pub complexity_threshold: f64,
    #[serde(default)]
    pub force_cloud_patterns: Vec<String>,
    #[serde(default)]
    pub force_local_patterns: Vec<String>,
    #[serde(default = "default_max_local_tokens")]
    pub max_local_response_tokens: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: default_threshold(),
            force_cloud_patterns: Vec::new(),
            force_local_patterns: Vec::new(),
            max_local_response_tokens: default_max_local_tokens(),
        }
    }
}

/// Degradation policy (spec §3 `fallback.*`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FallbackConfig {
    #[serde(default)]
    pub on_cloud_unavailable: OnCloudUnavailable,
    #[serde(default)]
    pub on_local_error: OnLocalError,
}

fn default_local_model() -> ModelRef {
    ModelRef::new(Provider::Ollama, "functiongemma")
}

/// Top-level router configuration, as read from the host's `router.*` config
/// subtree (spec §4.1 defaults table).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub preference: Preference,
    #[serde(default = "default_local_model")]
    pub local_model: ModelRef,
    #[serde(default)]
    pub local_text_model: Option<ModelRef>,
    #[serde(default)]
    pub cloud_model: Option<ModelRef>,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            preference: Preference::default(),
            local_model: default_local_model(),
            local_text_model: None,
            cloud_model: None,
            routing: RoutingConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Auth profiles from the host's top-level `auth.profiles` map: provider name
/// → a pre-resolved credential value. The credential resolver consults this
/// before the agent-local profile file or environment variables (spec §4.7).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthProfiles {
    #[serde(default)]
    pub profiles: HashMap<String, String>,
}

/// The document the router actually parses out of the host's config tree:
/// its own subtree plus the `auth.profiles` map it needs for credential
/// detection (spec §6).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub auth: AuthProfiles,
}

impl HostConfig {
    /// Load, parse, and validate a TOML config file (spec §4.1, §7
    /// `config-invalid`), mirroring the teacher's `Config::load` →
    /// `validate()` sequence. Regex compilation is a separate step — call
    /// [`CompiledPatterns::compile`] — since pattern-compile failures are
    /// warnings, not load failures.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("parsing router config TOML")?;
        config.router.validate()?;
        Ok(config)
    }
}

impl RouterConfig {
    /// Eagerly reject a structurally invalid config at construction time
    /// (spec §4.1, §7 `config-invalid`: "missing required local model,
    /// unparseable preference, etc. Fatal during construction"), mirroring
    /// the teacher's `Config::validate` in `config.rs`.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0.0..=1.0).contains(&self.routing.complexity_threshold) {
            return Err(crate::error::RouterError::ConfigInvalid(format!(
                "routing.complexity_threshold must be within [0, 1], got {}",
                self.routing.complexity_threshold
            )));
        }
        Ok(())
    }
}

/// Pre-compiled, case-insensitive regex lists. Produced once from
/// `RoutingConfig::{force_cloud_patterns,force_local_patterns}` at
/// `Router::new` time; invalid entries are dropped with a logged warning,
/// never failing construction (spec §4.1, §7 `pattern-compile`).
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    pub force_cloud: Vec<Regex>,
    pub force_local: Vec<Regex>,
}

impl CompiledPatterns {
    pub fn compile(routing: &RoutingConfig) -> Self {
        Self {
            force_cloud: compile_case_insensitive(&routing.force_cloud_patterns),
            force_local: compile_case_insensitive(&routing.force_local_patterns),
        }
    }
}

fn compile_case_insensitive(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| {
            let wrapped = format!("(?i){p}");
            match Regex::new(&wrapped) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "dropping unparseable regex pattern");
                    None
                }
            }
        })
        .collect()
}
