//! Development session: content watcher plus the template's dev server.

use std::future::Future;
use std::path::PathBuf;

use speed_docs_content::SyncError;
use tokio::sync::oneshot;

use crate::process::{check_status, PackageManager, ProcessError};
use crate::watch_loop::{WatchLoop, WatchStats};
use crate::watcher::FileWatcher;

/// Configuration for a development session.
#[derive(Debug, Clone)]
pub struct DevSessionConfig {
    /// User content directory to watch
    pub origin: PathBuf,

    /// Template instance receiving the content and running the server
    pub template: PathBuf,

    /// Package manager that starts the dev server
    pub package_manager: PackageManager,
}

/// Errors that can occur in development mode.
#[derive(Debug, thiserror::Error)]
pub enum DevError {
    #[error("File watch error: {0}")]
    Watch(#[source] std::io::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Dev server failed: {0}")]
    DevServer(#[from] ProcessError),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Runs the watch loop next to the dev server until interrupted.
pub struct DevSession {
    config: DevSessionConfig,
}

impl DevSession {
    /// Create a new development session.
    pub fn new(config: DevSessionConfig) -> Self {
        Self { config }
    }

    /// Watch the origin and serve the template.
    ///
    /// Returns when Ctrl-C is received or the dev server exits. A non-zero
    /// dev server exit is an error. The watch subscription is closed before
    /// returning in every case.
    pub async fn run(self) -> Result<WatchStats, DevError> {
        let DevSessionConfig {
            origin,
            template,
            package_manager,
        } = self.config;

        let (watcher, events) = FileWatcher::new(&origin).map_err(DevError::Watch)?;
        tracing::info!("Watching for changes in: {}", origin.display());

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let watch = WatchLoop::new(origin, template.clone(), events);
        let watch_task = tokio::spawn(watch.run(async move {
            let _ = stop_rx.await;
        }));

        tracing::info!("Starting development server...");
        let outcome = match package_manager.spawn_dev(&template) {
            Ok(mut child) => {
                tokio::select! {
                    _ = interrupted() => {
                        tracing::warn!("Shutting down...");
                        Ok(())
                    }
                    status = child.wait() => {
                        let command = package_manager.describe(&["run", "dev"]);
                        match status {
                            Ok(status) => check_status(command, status).map_err(DevError::from),
                            Err(e) => Err(ProcessError::Spawn { command, source: e }.into()),
                        }
                    }
                }
            }
            Err(e) => Err(e.into()),
        };

        let _ = stop_tx.send(());
        let stats = watch_task
            .await
            .map_err(|e| DevError::Task(e.to_string()))?;
        drop(watcher);

        tracing::info!(
            "Watcher closed after {} updates ({} failed)",
            stats.succeeded,
            stats.failed
        );

        outcome.map(|()| stats)
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never
/// resolves, leaving the session to end with the dev server.
async fn interrupted() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
