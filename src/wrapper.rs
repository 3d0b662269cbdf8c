//! Stream Wrapper: spec §4.8.
//!
//! Grounded on the teacher's `RouterState` in `router.rs` — immutable-after-
//! init config/model handles behind shared ownership, one per-call entry
//! point — generalized from an HTTP route handler to the `StreamFn`
//! composition spec §9's design note describes for languages without
//! first-class function values as call-site targets: "an interface with one
//! method and a wrapping struct that holds the downstream implementation."

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::Value;

use crate::adapter::adapt_context;
use crate::classifier::classify;
use crate::config::{CompiledPatterns, HostConfig, ModelRef, RouterConfig};
use crate::context::Context;
use crate::credentials::CredentialResolver;
use crate::decision::{decide, Target};
use crate::error::RouterError;
use crate::identity::IdentityPreamble;
use crate::models::{ModelResolver, ResolvedModels};

/// One chunk of the host's model output stream. The wrapper never inspects
/// or transforms items — it only returns whatever `inner` produces
/// (spec §4.8 step 5, "return its result verbatim").
pub type StreamItem = anyhow::Result<Value>;

/// The host's opaque stream type, boxed so `StreamFn` stays dyn-compatible.
pub type ModelStream = BoxStream<'static, StreamItem>;

/// The per-call options bag (spec §3). A flat string-keyed map is sufficient
/// for every documented field (`maxLocalResponseTokens`, the resolved API
/// key); hosts that need richer structure nest it under a single key.
#[derive(Debug, Clone, Default)]
pub struct Options(pub HashMap<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.0.insert("api_key".to_owned(), Value::String(key.into()));
        self
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.0.insert("api_key".to_owned(), Value::String(key.into()));
    }

    pub fn set_max_local_response_tokens(&mut self, max_tokens: u32) {
        self.0.insert(
            "max_local_response_tokens".to_owned(),
            Value::Number(max_tokens.into()),
        );
    }
}

/// The host's stream function boundary contract (spec §4.8, §6 "Host stream
/// function (consumed)"). The wrapper treats it as opaque: it neither
/// inspects nor transforms what it returns.
#[async_trait]
pub trait StreamFn: Send + Sync {
    async fn call(
        &self,
        model: &ModelRef,
        context: &Context,
        options: &Options,
    ) -> anyhow::Result<ModelStream>;
}

/// Wraps a downstream `StreamFn`, inserting the routing decision ahead of
/// delegation. Implements `StreamFn` itself so wrapping composes without
/// subclassing (spec §9).
pub struct HybridRouterWrapper {
    config: RouterConfig,
    models: ResolvedModels,
    identity: IdentityPreamble,
    credentials: CredentialResolver,
    patterns: CompiledPatterns,
    inner: Arc<dyn StreamFn>,
}

impl HybridRouterWrapper {
    fn cloud_available(&self) -> bool {
        let Some(cloud_model) = self.config.cloud_model.as_ref() else {
            return false;
        };
        self.models.cloud_available(self.credentials.has_credential(cloud_model.provider))
    }
}

#[async_trait]
impl StreamFn for HybridRouterWrapper {
    async fn call(
        &self,
        model: &ModelRef,
        context: &Context,
        options: &Options,
    ) -> anyhow::Result<ModelStream> {
        let classification = classify(context, &self.patterns);
        let decision = decide(
            context,
            &self.config,
            &self.models,
            &classification,
            self.cloud_available(),
        )?;

        tracing::info!(
            target: "hybrid_router",
            model = %format!("{}/{}", decision.model.provider, decision.model.id),
            score = format!("{:.2}", decision.score),
            reason = %decision.reason,
            tags = ?decision.tags,
            "→ {} model={}/{} score={:.2} reason={} tags={:?}",
            decision.target.as_str(),
            decision.model.provider,
            decision.model.id,
            decision.score,
            decision.reason,
            decision.tags,
        );

        let mut effective_options = options.clone();
        if decision.model.provider != model.provider {
            if let Some(credential) = self.credentials.resolve(decision.model.provider) {
                effective_options.set_api_key(credential);
            }
        }
        if matches!(decision.target, Target::Local | Target::LocalText) {
            effective_options
                .set_max_local_response_tokens(self.config.routing.max_local_response_tokens);
        }

        let adapted = adapt_context(context, decision.target, &self.identity);
        let effective_model = ModelRef::new(decision.model.provider, decision.model.id.clone());

        self.inner.call(&effective_model, &adapted, &effective_options).await
    }
}

/// Composition root: builds a `HybridRouterWrapper` from host-provided
/// config and collaborators, or hands back `inner` untouched when the
/// router is disabled (spec §4.1, §8 round-trip property).
pub struct Router;

impl Router {
    /// Attempt to install the router ahead of `inner`.
    ///
    /// Returns `Ok(inner)` unchanged when `host_config.router.enabled` is
    /// false — the round-trip property spec §8 requires. Returns `Err` only
    /// when the mandatory local model fails to resolve (spec §4.2).
    pub async fn try_wrap(
        host_config: &HostConfig,
        resolver: &dyn ModelResolver,
        identity: IdentityPreamble,
        oauth_profile_path: Option<PathBuf>,
        inner: Arc<dyn StreamFn>,
    ) -> Result<Arc<dyn StreamFn>, RouterError> {
        if !host_config.router.enabled {
            return Ok(inner);
        }

        host_config.router.validate()?;

        let models = ResolvedModels::resolve(
            resolver,
            &host_config.router.local_model,
            host_config.router.local_text_model.as_ref(),
            host_config.router.cloud_model.as_ref(),
        )
        .await?;

        let patterns = CompiledPatterns::compile(&host_config.router.routing);
        let credentials = CredentialResolver::new(&host_config.auth, oauth_profile_path);

        Ok(Arc::new(HybridRouterWrapper {
            config: host_config.router.clone(),
            models,
            identity,
            credentials,
            patterns,
            inner,
        }))
    }
}
