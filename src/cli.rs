use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::error::Result;
use crate::features::FEATURE_COUNT;
use crate::ml::load_classifier;

#[derive(Parser, Debug)]
#[command(name = "wine-quality")]
#[command(version)]
#[command(about = "Wine quality prediction web form", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = AppConfig::DEFAULT_PATH)]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the prediction form (default)
    Serve,
    /// Load the configured model artifact, print a summary and exit
    Check,
}

/// Load the configured artifact and describe it on stdout.
pub fn check_model(config: &AppConfig) -> Result<()> {
    let model = load_classifier(&config.model.path)?;
    println!("model:    {}", config.model.path.display());
    println!("kind:     {}", model.kind());
    println!("features: {}", FEATURE_COUNT);
    println!("classes:  {:?}", model.classes());
    Ok(())
}
