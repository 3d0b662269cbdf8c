//! `route_probe` — a small auxiliary binary that loads a router config and a
//! JSON `Context` from disk, runs classify+decide, and prints the resulting
//! `Decision`. No routing logic of its own; exists to let an operator
//! reproduce a routing decision outside the host process.
//!
//! Grounded on the teacher's `--healthcheck` one-shot subcommand in
//! `main.rs`: a secondary, minimal entry path alongside the main system,
//! not a server of its own.

use std::path::PathBuf;

use clap::Parser;
use hybrid_model_router::config::{CompiledPatterns, HostConfig};
use hybrid_model_router::context::Context;
use hybrid_model_router::models::{ModelResolver, ResolvedModels, StaticModelResolver};
use hybrid_model_router::{classifier, decision};

/// Reproduce a single routing decision for a given config and context.
#[derive(Parser, Debug)]
#[command(name = "route_probe", version, about)]
struct Args {
    /// Path to a TOML file containing the `[router]` (and optionally
    /// `[auth]`) config tree.
    #[arg(long)]
    config: PathBuf,

    /// Path to a JSON file containing a serialized `Context`.
    #[arg(long)]
    context: PathBuf,

    /// Assume a cloud credential is present even if none can be resolved
    /// from the environment, for offline experimentation.
    #[arg(long)]
    assume_cloud_available: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hybrid_model_router=info".into()),
        )
        .init();

    let args = Args::parse();

    let host_config = HostConfig::load(&args.config)?;
    let context_json = std::fs::read_to_string(&args.context)?;
    let context: Context = serde_json::from_str(&context_json)?;

    let resolver = StaticModelResolver;
    let models = ResolvedModels::resolve(
        &resolver as &dyn ModelResolver,
        &host_config.router.local_model,
        host_config.router.local_text_model.as_ref(),
        host_config.router.cloud_model.as_ref(),
    )
    .await?;

    let patterns = CompiledPatterns::compile(&host_config.router.routing);
    let classification = classifier::classify(&context, &patterns);

    let cloud_available = args.assume_cloud_available
        && host_config.router.cloud_model.is_some();

    let decision = decision::decide(
        &context,
        &host_config.router,
        &models,
        &classification,
        cloud_available,
    )?;

    println!(
        "target={} model={}/{} score={:.2} reason={} tags={:?}",
        decision.target.as_str(),
        decision.model.provider,
        decision.model.id,
        decision.score,
        decision.reason,
        decision.tags,
    );

    Ok(())
}
