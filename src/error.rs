//! Error taxonomy for the router core.
//!
//! Mirrors the teacher's split between `anyhow` for internal propagation and
//! a typed wrapper at the crate boundary — `error::AppError` there wraps
//! `anyhow::Error` for axum handlers; [`RouterError`] plays the same role
//! here for library callers, with no HTTP response to produce.

use thiserror::Error;

/// Errors the router construction and decision path can report.
///
/// Only [`RouterError::ConfigInvalid`] and [`RouterError::LocalModelMissing`]
/// are fatal to [`crate::Router::new`] — everything else is either logged
/// and degraded past (credential/model-resolve failures for optional
/// backends) or surfaced to the caller of a specific call (`StreamError`).
#[derive(Debug, Error)]
pub enum RouterError {
    /// The router config itself is structurally invalid (bad TOML, an
    /// out-of-range value). Fatal at construction.
    #[error("invalid router configuration: {0}")]
    ConfigInvalid(String),

    /// The mandatory local tool-calling model could not be resolved. Fatal —
    /// the router refuses to install without it (spec §4.2).
    #[error("local tool model `{provider}/{id}` could not be resolved")]
    LocalModelMissing { provider: String, id: String },

    /// A non-mandatory backend (local-text or cloud) failed to resolve.
    /// Never fatal; the router degrades to a leaner backend set.
    #[error("model `{provider}/{id}` could not be resolved: {reason}")]
    ModelResolve {
        provider: String,
        id: String,
        reason: String,
    },

    /// Credential lookup failed for a provider switch. Never fatal; the
    /// original options are forwarded unchanged.
    #[error("credential resolution failed for provider `{provider}`: {reason}")]
    CredentialResolve { provider: String, reason: String },

    /// The cloud backend was unavailable and `fallback.on_cloud_unavailable`
    /// is `error`, so the Decision Engine refuses to degrade (spec §3
    /// `fallback.onCloudUnavailable`, §7). Surfaced to the caller of that
    /// specific call rather than being fatal at construction.
    #[error("cloud backend unavailable for `{0}` and fallback.on_cloud_unavailable is `error`")]
    CloudUnavailable(String),

    /// The delegated stream function returned an error. The router does not
    /// retry this itself (spec §7).
    #[error("downstream stream call failed: {0}")]
    StreamError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RouterError>;
