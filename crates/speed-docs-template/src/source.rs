//! Trait definitions for template sources.

use std::future::Future;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::fetch::FetchError;

/// A template unpacked into a temporary working directory.
///
/// Dropping it removes the working directory and everything under it, so
/// callers copy what they need out of [`root`](Self::root) first.
#[derive(Debug)]
pub struct FetchedTemplate {
    workdir: TempDir,
    root: PathBuf,
}

impl FetchedTemplate {
    /// Wrap an unpacked template located at `root` inside `workdir`.
    pub fn new(workdir: TempDir, root: PathBuf) -> Self {
        Self { workdir, root }
    }

    /// Absolute path to the template subtree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The temporary directory holding the unpacked archive.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }
}

/// Something that can produce a fresh template instance.
pub trait TemplateSource: Send + Sync {
    /// Human-readable origin of the template (usually a URL).
    fn describe(&self) -> String;

    /// Produce a template instance. One attempt, no retries.
    fn fetch(&self) -> impl Future<Output = Result<FetchedTemplate, FetchError>> + Send;
}
