//! Relocation of a finished static build.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::mirror::Mirror;

/// Default name of the relocated build directory.
pub const OUTPUT_DIR: &str = "docs-output";

/// Errors that abort relocation. Per-item copy failures are not errors.
#[derive(Debug, thiserror::Error)]
pub enum RelocateError {
    #[error("Build output directory not found: {0}")]
    BuildOutputMissing(PathBuf),

    #[error("Failed to prepare output directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a relocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelocationReport {
    /// Top-level items copied
    pub copied: usize,

    /// Items listed but gone by the time they were copied
    pub skipped: Vec<String>,

    /// Items that failed to copy
    pub failed: Vec<String>,
}

/// Copy the contents of `build_out` into a fresh `target` directory.
///
/// Any existing `target` is removed first. Each top-level item is copied on
/// its own; a missing or failing item is logged and the rest still run.
pub fn relocate_output(build_out: &Path, target: &Path) -> Result<RelocationReport, RelocateError> {
    if !build_out.is_dir() {
        return Err(RelocateError::BuildOutputMissing(build_out.to_path_buf()));
    }

    let prepare_err = |e: std::io::Error| RelocateError::Prepare {
        path: target.to_path_buf(),
        source: e,
    };
    if target.exists() {
        fs::remove_dir_all(target).map_err(prepare_err)?;
    }
    fs::create_dir_all(target).map_err(prepare_err)?;

    let entries = fs::read_dir(build_out).map_err(|e| RelocateError::Prepare {
        path: build_out.to_path_buf(),
        source: e,
    })?;

    let mut report = RelocationReport::default();
    let items = list_items(
        build_out,
        entries.map(|entry| entry.map(|e| e.file_name())),
        &mut report,
    );

    tracing::info!("Found {} items in build output", items.len());

    let mirror = Mirror::verbatim();

    for item in items {
        let name = item.to_string_lossy().into_owned();
        let from = build_out.join(&item);

        if !from.exists() {
            tracing::warn!("Skipping missing file: {}", name);
            report.skipped.push(name);
            continue;
        }

        tracing::debug!("Copying: {}", name);
        match mirror.copy(&from, &target.join(&item)) {
            Ok(_) => report.copied += 1,
            Err(e) => {
                tracing::warn!("Error copying {}: {}", name, e);
                report.failed.push(name);
            }
        }
    }

    Ok(report)
}

/// Sorted item names; unreadable entries are logged and counted as failed.
fn list_items<I>(dir: &Path, entries: I, report: &mut RelocationReport) -> Vec<OsString>
where
    I: IntoIterator<Item = std::io::Result<OsString>>,
{
    let mut items = Vec::new();
    for entry in entries {
        match entry {
            Ok(name) => items.push(name),
            Err(e) => {
                tracing::warn!("Error reading entry in {}: {}", dir.display(), e);
                report.failed.push(dir.display().to_string());
            }
        }
    }
    items.sort();
    items
}
