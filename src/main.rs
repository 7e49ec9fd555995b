use clap::Parser;
use tracing::{error, info};
use wine_quality::api::{AppState, WebServer};
use wine_quality::cli::{self, Cli, Commands};
use wine_quality::config::AppConfig;
use wine_quality::error::Result;
use wine_quality::logging::{init_logging, init_logging_simple};
use wine_quality::ml::load_classifier;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Check => {
            init_logging_simple();
            cli::check_model(&config)?;
        }
        Commands::Serve => {
            init_logging(&config.logging);
            run_server(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    info!(config = ?config, "Starting wine quality service");

    // Missing or corrupt artifact is fatal.
    let classifier = load_classifier(&config.model.path).map_err(|e| {
        error!(path = %config.model.path.display(), error = %e, "failed to load model");
        e
    })?;

    let state = AppState::new(classifier)?;
    let addr = config.server.bind_addr()?;
    WebServer::new(state, addr, config.server.static_dir.clone())
        .run()
        .await
}
