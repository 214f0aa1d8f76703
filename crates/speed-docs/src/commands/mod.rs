//! Command sequencing shared by build and dev mode.

use std::path::PathBuf;

use anyhow::{Context, Result};
use speed_docs_content::sync_content;
use speed_docs_template::{TemplateCache, TemplateFetcher};

use crate::config::Settings;

pub mod build;
pub mod dev;

/// Resolve the template, install its dependencies and copy content in.
///
/// Returns the template instance path.
pub async fn prepare(settings: &Settings) -> Result<PathBuf> {
    let cache = TemplateCache::new(&settings.cache_root);
    let fetcher =
        TemplateFetcher::new(&settings.template_url).with_subdir(&settings.template_subdir);

    let template = cache
        .resolve(&fetcher, settings.force)
        .await
        .context("Failed to get template")?;

    settings
        .package_manager
        .install(&template)
        .await
        .context("Failed to install dependencies")?;

    sync_content(&settings.origin, &template)?;
    tracing::info!("Successfully validated and copied content!");

    Ok(template)
}
