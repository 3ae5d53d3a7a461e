use anyhow::Context;
use quill_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Quill settings")?;
    quill_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        "quill-app bootstrap starting"
    );

    quill_app::run(settings).await
}
