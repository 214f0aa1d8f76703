//! Static site build command.

use std::path::Path;

use anyhow::{Context, Result};
use speed_docs_content::relocate_output;

use crate::config::Settings;

/// Directory the template's build writes to.
const BUILD_OUT_DIR: &str = "out";

/// Build the site and relocate the output next to the caller.
pub async fn run(settings: &Settings, template: &Path) -> Result<()> {
    tracing::info!("Building for production...");

    settings
        .package_manager
        .build(template)
        .await
        .context("Build failed")?;

    tracing::info!("Copying build output to {}...", settings.output_dir.display());
    let report = relocate_output(&template.join(BUILD_OUT_DIR), &settings.output_dir)?;

    if !report.failed.is_empty() {
        tracing::warn!("Some items could not be copied: {}", report.failed.join(", "));
    }

    tracing::info!("Documentation built and copied successfully!");
    tracing::info!("Output location: {}", settings.output_dir.display());

    Ok(())
}
