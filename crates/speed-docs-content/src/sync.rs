//! Validate-and-copy of an origin directory into a template instance.

use std::fs;
use std::path::{Path, PathBuf};

use crate::mirror::{Mirror, MirrorError, MirrorReport, PUBLIC_DIR};
use crate::validate::{validate_origin, ValidationError};

/// Name of the content directory inside a template instance.
pub const CONTENT_DIR: &str = "content";

/// Errors raised while syncing content.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error("Failed to reset content directory {path}: {source}")]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where user content lands inside a template instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLayout {
    /// Mirror of the origin directory, minus images
    pub content_dir: PathBuf,

    /// Flat image directory
    pub public_dir: PathBuf,
}

impl ContentLayout {
    /// Layout for the template instance rooted at `template`.
    pub fn for_template(template: &Path) -> Self {
        Self {
            content_dir: template.join(CONTENT_DIR),
            public_dir: template.join(PUBLIC_DIR),
        }
    }
}

/// Result of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub files: usize,
    pub images: usize,
    pub dirs: usize,
}

impl From<MirrorReport> for SyncReport {
    fn from(report: MirrorReport) -> Self {
        Self {
            files: report.files,
            images: report.images,
            dirs: report.dirs,
        }
    }
}

/// Validate `origin` and mirror it into the template's content directory.
///
/// The content directory is deleted and recreated after validation passes,
/// so a rejected origin leaves the previous content untouched. The public
/// directory is only ever added to.
pub fn sync_content(origin: &Path, template: &Path) -> Result<SyncReport, SyncError> {
    tracing::info!("Validating and copying content from: {}", origin.display());

    validate_origin(origin)?;

    let layout = ContentLayout::for_template(template);
    reset_dir(&layout.content_dir)?;

    tracing::info!(
        "Copying contents from {} to {}...",
        origin.display(),
        layout.content_dir.display()
    );
    let report = Mirror::with_public_assets(&layout.content_dir).copy(origin, &layout.content_dir)?;

    tracing::info!(
        "Copied {} files and {} images",
        report.files,
        report.images
    );

    Ok(report.into())
}

fn reset_dir(dir: &Path) -> Result<(), SyncError> {
    let reset_err = |e: std::io::Error| SyncError::Reset {
        path: dir.to_path_buf(),
        source: e,
    };

    if dir.exists() {
        tracing::debug!("Removing existing content directory...");
        fs::remove_dir_all(dir).map_err(reset_err)?;
    }
    fs::create_dir_all(dir).map_err(reset_err)?;

    Ok(())
}
