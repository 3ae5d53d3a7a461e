use anyhow::Context;
use clap::{Parser, Subcommand};
use quill_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "Quill digital product catalogue")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Override the configured bind host.
        #[arg(long)]
        host: Option<String>,
        /// Override the configured bind port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved settings as JSON.
    Settings,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().context("failed to load Quill settings")?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            quill_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "quill serve starting");

            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(quill_app::run(settings))
        }
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
