//! `hybrid_model_router` — a complexity-based request router sitting between
//! a conversational agent's inference loop and its model backends.
//!
//! The host owns configuration I/O, the conversation loop, tool execution,
//! and the transport to each backend. This crate owns exactly the routing
//! core described in each module below: it wraps the host's stream function
//! so a single call site transparently targets a local tool-calling model, a
//! local text-only model, or a remote cloud model, picked per turn by the
//! [`classifier`] and [`decision`] engine.
//!
//! Composition root, adapted from the teacher's `main.rs` `mod`/`pub use`
//! list — a library root instead of a server bootstrap, since the
//! surrounding agent runtime is a host responsibility, not this crate's.

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod context;
pub mod credentials;
pub mod decision;
pub mod error;
pub mod identity;
pub mod models;
pub mod provider;
pub mod wrapper;

pub use config::{HostConfig, ModelRef, Preference, RouterConfig};
pub use context::{Context, ContentPart, Message, Role, ToolSchema};
pub use decision::{decide, Decision, Target};
pub use error::{Result, RouterError};
pub use identity::IdentityPreamble;
pub use models::{EnvModelResolver, ModelResolver, ResolvedModel, ResolvedModels, StaticModelResolver};
pub use provider::Provider;
pub use wrapper::{ModelStream, Options, Router, StreamFn};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct EchoStreamFn;

    #[async_trait::async_trait]
    impl StreamFn for EchoStreamFn {
        async fn call(
            &self,
            _model: &ModelRef,
            _context: &Context,
            _options: &Options,
        ) -> anyhow::Result<ModelStream> {
            Ok(Box::pin(futures_util::stream::once(async {
                Ok(serde_json::Value::String("ok".into()))
            })))
        }
    }

    #[tokio::test]
    async fn disabled_config_round_trips_stream_fn_unchanged() {
        let host_config = HostConfig::default();
        let resolver = StaticModelResolver;
        let inner: Arc<dyn StreamFn> = Arc::new(EchoStreamFn);
        let wrapped = Router::try_wrap(
            &host_config,
            &resolver,
            IdentityPreamble::compose(None, None, None),
            None,
            inner.clone(),
        )
        .await
        .unwrap();
        assert!(Arc::ptr_eq(&wrapped, &inner));
    }

    #[test]
    fn public_reexports_cover_every_module_named_in_the_pipeline() {
        let _: fn() -> RouterConfig = RouterConfig::default;
        let _: fn(Provider, &str) -> ModelRef = ModelRef::new;
        let _ = Target::Local;
    }
}
