//! Quill application library: the digital product catalogue modules and the
//! process lifecycle that hosts them.

use anyhow::Context;
use quill_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Build the module registry with every application module registered.
pub fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;
    Ok(registry)
}

/// Bring modules up, serve HTTP until Ctrl-C, then stop modules in reverse.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry()?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;
    tracing::info!(modules = registry.len(), "modules started");

    let served = quill_http::start_server(&registry, &settings, shutdown_signal()).await;

    registry
        .stop_all()
        .await
        .context("failed to stop modules cleanly")?;
    served
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
