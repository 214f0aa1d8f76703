//! Structural validation of an origin directory.
//!
//! An origin directory must carry a `config.json` manifest and a `docs/`
//! directory. Only JSON well-formedness is checked; the manifest schema is
//! left to the rendering framework.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Name of the site manifest at the origin root.
pub const MANIFEST_FILE: &str = "config.json";

/// Name of the required docs directory at the origin root.
pub const DOCS_DIR: &str = "docs";

/// Errors raised while validating an origin directory.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Origin directory does not exist: {0}")]
    OriginMissing(PathBuf),

    #[error("Origin path is not a directory: {0}")]
    OriginNotDirectory(PathBuf),

    #[error("config.json file is missing in origin directory: {0}")]
    ManifestMissing(PathBuf),

    #[error("config.json is not valid JSON: {path}: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    #[error("docs directory is missing in origin directory: {0}")]
    DocsMissing(PathBuf),

    #[error("docs exists but is not a directory: {0}")]
    DocsNotDirectory(PathBuf),

    #[error("Invalid JSON file {path}: {message}")]
    InvalidJson { path: PathBuf, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validate an origin directory.
///
/// Checks run in order and the first failure aborts: the origin is a
/// directory, `config.json` exists and parses, `docs` exists and is a
/// directory, and every `*.json` file under `docs` parses.
pub fn validate_origin(origin: &Path) -> Result<(), ValidationError> {
    tracing::info!("Validating origin directory structure...");

    if !origin.exists() {
        return Err(ValidationError::OriginMissing(origin.to_path_buf()));
    }
    if !origin.is_dir() {
        return Err(ValidationError::OriginNotDirectory(origin.to_path_buf()));
    }

    let manifest = origin.join(MANIFEST_FILE);
    if !manifest.is_file() {
        return Err(ValidationError::ManifestMissing(manifest));
    }
    parse_json(&manifest).map_err(|e| match e {
        ValidationError::InvalidJson { path, message } => {
            ValidationError::ManifestInvalid { path, message }
        }
        other => other,
    })?;
    tracing::debug!("config.json is valid JSON");

    let docs = origin.join(DOCS_DIR);
    if !docs.exists() {
        return Err(ValidationError::DocsMissing(docs));
    }
    if !docs.is_dir() {
        return Err(ValidationError::DocsNotDirectory(docs));
    }

    let checked = validate_json_tree(&docs)?;
    tracing::debug!("Validated {} JSON files under docs", checked);

    Ok(())
}

/// Parse every file ending in `.json` below `dir`, at any depth.
///
/// Symlinks are followed the same way [`Mirror::copy`] follows them, so
/// nothing reaches the content directory unchecked. Returns the number of
/// files checked.
///
/// [`Mirror::copy`]: crate::mirror::Mirror::copy
fn validate_json_tree(dir: &Path) -> Result<usize, ValidationError> {
    let mut checked = 0;

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ValidationError::Read {
                path,
                source: e.into(),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(".json") {
            continue;
        }

        parse_json(entry.path())?;
        tracing::debug!("Valid JSON file: {}", entry.path().display());
        checked += 1;
    }

    Ok(checked)
}

fn parse_json(path: &Path) -> Result<(), ValidationError> {
    let content = fs::read_to_string(path).map_err(|e| ValidationError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str::<serde_json::Value>(&content).map_err(|e| {
        ValidationError::InvalidJson {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    Ok(())
}
