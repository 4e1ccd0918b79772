use anyhow::{Context, Result};
use career_engine::app_log;
use career_engine::core::ConfigManager;
use career_engine::{handle_command, Cli};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "career_engine=info,rocket::server=off";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Config is read before the log file is known, so its messages go to stdout
fn load_config<S>(path: &Path, bootstrap: S) -> Result<ConfigManager>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(bootstrap, || ConfigManager::load(path))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = env_filter();

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let bootstrap = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter());
    let config = load_config(&cli.config, bootstrap)?;
    init_logging(config.environment.log_file.as_deref())?;

    app_log!(
        info,
        "Environment: {}",
        std::env::var("CAREERAI_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    );

    handle_command(cli.command, config).await
}
