use async_trait::async_trait;
use axum::Router;

/// Context handed to modules while they are brought up.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A feature module hosted by the Quill kernel.
///
/// Lifecycle hooks run in registration order (`init`, then `start`) and
/// `stop` runs in reverse order during shutdown.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; routes are mounted under `/api/{name}`.
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Router carrying this module's handlers with their state already applied.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into the
    /// service-wide document. Paths are relative to the module mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
