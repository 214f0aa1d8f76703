//! speed-docs CLI - create online documentation quickly.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "speed-docs")]
#[command(about = "A CLI tool to create online documentation quickly")]
#[command(version)]
pub struct Cli {
    /// Path to the directory containing your content (config.json and docs/)
    origin: PathBuf,

    /// Run in development mode with file watching
    #[arg(long)]
    dev: bool,

    /// Override the default template archive URL
    #[arg(long, value_name = "URL")]
    template: Option<String>,

    /// Force redownload of the template (ignores cache)
    #[arg(long)]
    force: bool,

    /// Override the default download/cache directory
    #[arg(long, value_name = "PATH")]
    download_dir: Option<PathBuf>,

    /// Path to speed-docs.toml config file
    #[arg(short, long, default_value = "speed-docs.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let file_config = config::load_config(&cli.config)?;
    let settings = config::Settings::resolve(&cli, file_config, &std::env::current_dir()?)?;

    tracing::info!("Speed Docs CLI");
    tracing::info!("Using download directory: {}", settings.cache_root.display());

    let template = commands::prepare(&settings).await?;

    if settings.dev {
        commands::dev::run(&settings, template).await?;
    } else {
        commands::build::run(&settings, &template).await?;
    }

    Ok(())
}
