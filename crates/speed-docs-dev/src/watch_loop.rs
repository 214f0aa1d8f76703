//! Event loop that keeps a template's content in step with the origin.
//!
//! Events arrive on a single channel and are handled one at a time, so two
//! copy passes never run concurrently. Events that queue up while a pass is
//! running are folded into the next pass, since every pass rebuilds the
//! whole content directory anyway.

use std::future::Future;
use std::path::{Path, PathBuf};

use speed_docs_content::{sync_content, SyncReport};
use tokio::sync::mpsc;

use crate::session::DevError;
use crate::watcher::WatchEvent;

/// Counts of sync passes run by a loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Outcome of one watch-triggered sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Content was validated and copied
    Updated {
        /// Path whose change triggered the pass
        trigger: PathBuf,
        /// Files copied into the content directory
        files: usize,
        /// Images copied into the public directory
        images: usize,
    },

    /// Validation or copying failed; the loop keeps running
    Failed {
        /// Path whose change triggered the pass
        trigger: PathBuf,
        /// Rendered error
        error: String,
    },
}

impl SyncStatus {
    /// Whether the pass succeeded.
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncStatus::Updated { .. })
    }
}

/// Re-runs the content sync for every batch of watch events.
pub struct WatchLoop {
    origin: PathBuf,
    template: PathBuf,
    events: mpsc::Receiver<WatchEvent>,
    reporter: Option<mpsc::UnboundedSender<SyncStatus>>,
}

impl WatchLoop {
    /// Create a loop syncing `origin` into `template` on each event.
    pub fn new(origin: PathBuf, template: PathBuf, events: mpsc::Receiver<WatchEvent>) -> Self {
        Self {
            origin,
            template,
            events,
            reporter: None,
        }
    }

    /// Also send the outcome of every pass to `reporter`. Without one,
    /// outcomes only go to the log.
    pub fn with_reporter(mut self, reporter: mpsc::UnboundedSender<SyncStatus>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Run until `shutdown` resolves or the event channel closes.
    ///
    /// A failing pass is logged and reported; it never ends the loop.
    pub async fn run<F>(mut self, shutdown: F) -> WatchStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = WatchStats::default();

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => break,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            let mut trigger = event;
            self.log_event(&trigger);
            while let Ok(next) = self.events.try_recv() {
                self.log_event(&next);
                trigger = next;
            }

            let trigger = trigger.path().to_path_buf();
            match self.sync_once().await {
                Ok(report) => {
                    tracing::info!("Content updated successfully");
                    stats.succeeded += 1;
                    self.report(SyncStatus::Updated {
                        trigger,
                        files: report.files,
                        images: report.images,
                    });
                }
                Err(e) => {
                    tracing::error!("Error updating content: {}", e);
                    stats.failed += 1;
                    self.report(SyncStatus::Failed {
                        trigger,
                        error: e.to_string(),
                    });
                }
            }
        }

        stats
    }

    async fn sync_once(&self) -> Result<SyncReport, DevError> {
        let (origin, template) = (self.origin.clone(), self.template.clone());
        let report = tokio::task::spawn_blocking(move || sync_content(&origin, &template))
            .await
            .map_err(|e| DevError::Task(e.to_string()))??;
        Ok(report)
    }

    fn report(&self, status: SyncStatus) {
        if let Some(reporter) = &self.reporter {
            if reporter.send(status).is_err() {
                tracing::debug!("Sync status receiver dropped");
            }
        }
    }

    fn log_event(&self, event: &WatchEvent) {
        let path = relative_to(&self.origin, event.path());
        tracing::info!("{}: {}", event.label(), path.display());
    }
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    path.strip_prefix(&root).unwrap_or(path)
}
