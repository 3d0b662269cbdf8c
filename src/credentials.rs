//! Credential Resolver & Cache: spec §4.7.
//!
//! Resolution order: configured auth profiles → agent-local OAuth profile
//! file → fixed environment-variable table → provider-specific OAuth env
//! var. Grounded on the teacher's `RateLimiter::buckets` (`DashMap`-backed
//! per-key shared state in `api/rate_limit.rs`) for the concurrent
//! per-provider cache shape, and `config::BackendConfig::api_key()` for the
//! individual resolution step (env-var lookup, `Option` miss, never fatal).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::config::AuthProfiles;
use crate::provider::Provider;

/// Reads an agent-local file of `{provider}-...` keyed OAuth tokens, one per
/// line as `key=value`. The exact on-disk format is a host convention; the
/// resolver only needs "does a line start with `{provider}-`".
fn read_oauth_profile_file(path: &Path, provider: Provider) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let prefix = format!("{provider}-");
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim().starts_with(&prefix) {
            Some(value.trim().to_owned())
        } else {
            None
        }
    })
}

/// Resolves and caches API credentials per provider for the wrapper's
/// lifetime. Monotonic: once a key is resolved it is never invalidated
/// (spec §3 invariant, §5 "credential cache lives with the wrapper").
#[derive(Debug)]
pub struct CredentialResolver {
    auth_profiles: HashMap<String, String>,
    oauth_profile_path: Option<PathBuf>,
    cache: DashMap<String, String>,
}

impl CredentialResolver {
    pub fn new(auth_profiles: &AuthProfiles, oauth_profile_path: Option<PathBuf>) -> Self {
        Self {
            auth_profiles: auth_profiles.profiles.clone(),
            oauth_profile_path,
            cache: DashMap::new(),
        }
    }

    /// Resolve a credential for `provider`, consulting the cache first.
    /// Returns `None` (never an error) when no credential can be found —
    /// the caller forwards the original options and lets the downstream
    /// call fail with the host's usual auth error (spec §4.7).
    pub fn resolve(&self, provider: Provider) -> Option<String> {
        if let Some(cached) = self.cache.get(&provider.to_string()) {
            return Some(cached.clone());
        }

        let resolved = self
            .auth_profiles
            .get(&provider.to_string())
            .cloned()
            .or_else(|| {
                self.oauth_profile_path
                    .as_deref()
                    .and_then(|p| read_oauth_profile_file(p, provider))
            })
            .or_else(|| provider.env_var().and_then(|var| std::env::var(var).ok()))
            .or_else(|| provider.oauth_env_var().and_then(|var| std::env::var(var).ok()));

        match resolved {
            Some(value) => {
                self.cache.insert(provider.to_string(), value.clone());
                Some(value)
            }
            None => {
                tracing::warn!(%provider, "no credential could be resolved for provider");
                None
            }
        }
    }

    /// True iff a credential is resolvable for `provider` — does not itself
    /// cache, since `resolve` already does on success; a miss here should
    /// not be remembered as permanent (spec §4.4 `cloudAvailable`).
    pub fn has_credential(&self, provider: Provider) -> bool {
        self.resolve(provider).is_some()
    }
}
