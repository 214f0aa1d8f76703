//! Recursive directory mirroring with image routing.
//!
//! A [`Mirror`] reproduces a source tree under a destination root. When
//! built with [`Mirror::with_public_assets`], image files are not written
//! into the tree; they are copied by file name into a flat `public`
//! directory beside the destination root. Two images sharing a file name in
//! different sub-directories collide there and the one copied last wins.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extensions routed to the public assets directory (compared
/// case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico"];

/// Name of the flat assets directory created beside the destination root.
pub const PUBLIC_DIR: &str = "public";

/// Errors raised while mirroring a tree.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts collected during a mirror run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorReport {
    /// Files written into the destination tree
    pub files: usize,

    /// Images routed to the public assets directory
    pub images: usize,

    /// Directories visited (including the root)
    pub dirs: usize,
}

/// Directory mirror.
#[derive(Debug, Clone, Default)]
pub struct Mirror {
    /// Flat directory receiving image files. `None` copies images in place.
    assets_dir: Option<PathBuf>,
}

impl Mirror {
    /// Mirror that copies every file in place.
    pub fn verbatim() -> Self {
        Self { assets_dir: None }
    }

    /// Mirror that routes images to `parent(dest_root)/public`.
    pub fn with_public_assets(dest_root: &Path) -> Self {
        let parent = dest_root.parent().unwrap_or(dest_root);
        Self {
            assets_dir: Some(parent.join(PUBLIC_DIR)),
        }
    }

    /// The directory images are routed to, if any.
    pub fn assets_dir(&self) -> Option<&Path> {
        self.assets_dir.as_deref()
    }

    /// Mirror `src` into `dest`.
    ///
    /// Symlinks are followed, so a linked directory is copied as a real one.
    /// Existing destination directories are reused and existing files are
    /// overwritten. Nothing is deleted. An error aborts the walk; entries
    /// already copied stay on disk.
    pub fn copy(&self, src: &Path, dest: &Path) -> Result<MirrorReport, MirrorError> {
        let mut report = MirrorReport::default();

        for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| MirrorError::Read {
                path: e.path().unwrap_or(src).to_path_buf(),
                source: e.into(),
            })?;
            let from = entry.path();
            let to = match from.strip_prefix(src) {
                Ok(relative) if !relative.as_os_str().is_empty() => dest.join(relative),
                _ => dest.to_path_buf(),
            };

            if entry.file_type().is_dir() {
                fs::create_dir_all(&to).map_err(|e| MirrorError::CreateDir {
                    path: to.clone(),
                    source: e,
                })?;
                report.dirs += 1;
            } else if let Some(assets_dir) = self.image_target(from) {
                let Some(name) = from.file_name() else {
                    continue;
                };
                fs::create_dir_all(assets_dir).map_err(|e| MirrorError::CreateDir {
                    path: assets_dir.to_path_buf(),
                    source: e,
                })?;
                copy_file(from, &assets_dir.join(name))?;
                tracing::info!("Copied image: {} to public directory", name.to_string_lossy());
                report.images += 1;
            } else {
                copy_file(from, &to)?;
                tracing::debug!("Copied {}", to.display());
                report.files += 1;
            }
        }

        Ok(report)
    }

    fn image_target(&self, path: &Path) -> Option<&Path> {
        let assets_dir = self.assets_dir.as_deref()?;
        is_image(path).then_some(assets_dir)
    }
}

/// Whether `path` has one of the recognized image extensions.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), MirrorError> {
    fs::copy(from, to).map_err(|e| MirrorError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
