//! Development mode command.

use std::path::PathBuf;

use anyhow::Result;
use speed_docs_dev::{DevSession, DevSessionConfig};

use crate::config::Settings;

/// Run the watcher and dev server until interrupted.
pub async fn run(settings: &Settings, template: PathBuf) -> Result<()> {
    tracing::info!("Starting development mode...");
    tracing::info!("Press Ctrl+C to stop");

    let config = DevSessionConfig {
        origin: settings.origin.clone(),
        template,
        package_manager: settings.package_manager.clone(),
    };

    let stats = DevSession::new(config).run().await?;
    tracing::debug!("Dev session finished: {:?}", stats);

    Ok(())
}
