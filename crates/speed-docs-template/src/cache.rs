//! Single-slot template cache.
//!
//! The cache holds at most one template instance under `<root>/template`.
//! A slot counts as valid when every sentinel file exists. Contents are
//! never hashed or compared to the remote archive, so a valid slot can lag
//! behind upstream until a forced refresh replaces it.

use std::fs;
use std::path::{Path, PathBuf};

use speed_docs_content::{Mirror, MirrorError};

use crate::fetch::FetchError;
use crate::source::{FetchedTemplate, TemplateSource};

/// Files whose presence marks a cached template as usable.
pub const SENTINEL_FILES: &[&str] = &[
    "package.json",
    "next.config.mjs",
    "app/layout.tsx",
    "app/(docs)/layout.tsx",
];

/// Name of the slot directory under the cache root.
pub const TEMPLATE_SLOT: &str = "template";

/// Errors that can occur while resolving a cached template.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to prepare cache directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to store template in cache: {0}")]
    Store(#[from] MirrorError),
}

/// Template cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    root: PathBuf,
}

impl TemplateCache {
    /// Create a cache rooted at `root`. Nothing is touched on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the template slot.
    pub fn slot(&self) -> PathBuf {
        self.root.join(TEMPLATE_SLOT)
    }

    /// Sentinel files missing from the slot.
    pub fn missing_sentinels(&self) -> Vec<&'static str> {
        let slot = self.slot();
        SENTINEL_FILES
            .iter()
            .copied()
            .filter(|file| !slot.join(file).exists())
            .collect()
    }

    /// Whether the slot exists and holds every sentinel file.
    pub fn is_valid(&self) -> bool {
        self.slot().is_dir() && self.missing_sentinels().is_empty()
    }

    /// Resolve a usable template path.
    ///
    /// Reuses the slot when it is valid and `force` is false. Otherwise
    /// fetches from `source` and replaces the slot wholesale. The previous
    /// slot is left alone if the fetch fails.
    pub async fn resolve<S: TemplateSource>(
        &self,
        source: &S,
        force: bool,
    ) -> Result<PathBuf, CacheError> {
        if !force && self.is_valid() {
            tracing::info!("Using cached template");
            return Ok(self.slot());
        }

        if force {
            tracing::warn!("Force downloading template...");
        } else {
            tracing::info!("Template not cached, downloading...");
            tracing::debug!("Missing template files: {:?}", self.missing_sentinels());
        }

        let fetched = source.fetch().await?;
        let slot = self.store(&fetched)?;

        tracing::info!("Template cached successfully from {}", source.describe());
        Ok(slot)
    }

    /// Replace the slot with a copy of `fetched`.
    pub fn store(&self, fetched: &FetchedTemplate) -> Result<PathBuf, CacheError> {
        let slot = self.slot();

        fs::create_dir_all(&self.root).map_err(|e| CacheError::Prepare {
            path: self.root.clone(),
            source: e,
        })?;
        if slot.exists() {
            fs::remove_dir_all(&slot).map_err(|e| CacheError::Prepare {
                path: slot.clone(),
                source: e,
            })?;
        }

        Mirror::verbatim().copy(fetched.root(), &slot)?;

        Ok(slot)
    }
}
