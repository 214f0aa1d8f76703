//! File watching for live content sync.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Window in which rapid events are gathered before being forwarded.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File or directory was created
    Created(PathBuf),

    /// File was modified
    Modified(PathBuf),

    /// File or directory was deleted
    Deleted(PathBuf),
}

impl WatchEvent {
    /// Path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(p) | WatchEvent::Modified(p) | WatchEvent::Deleted(p) => p,
        }
    }

    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            WatchEvent::Created(_) => "File added",
            WatchEvent::Modified(_) => "File changed",
            WatchEvent::Deleted(_) => "File removed",
        }
    }
}

/// Recursive watcher over an origin directory.
///
/// Entries with a dot-prefixed path component are ignored. The underlying
/// subscription is closed when the watcher is dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Start watching `root`.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(root: &Path) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let root = root.canonicalize()?;
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                // Gather the rest of a burst so none of it is lost.
                let mut batch = vec![first];
                while let Ok(next) = sync_rx.recv_timeout(DEBOUNCE) {
                    batch.push(next);
                }

                for event in batch {
                    for path in &event.paths {
                        if is_hidden(&root, path) {
                            continue;
                        }
                        if let Some(e) = classify_event(path, &event.kind) {
                            if async_tx.blocking_send(e).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Whether `path` (below `root`) has a dot-prefixed component.
pub fn is_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => Some(WatchEvent::Modified(path.to_path_buf())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn hides_dot_entries() {
        let root = Path::new("/site/origin");

        assert!(is_hidden(root, Path::new("/site/origin/.git/HEAD")));
        assert!(is_hidden(root, Path::new("/site/origin/docs/.draft.mdx")));
        assert!(!is_hidden(root, Path::new("/site/origin/docs/guide.mdx")));
        // Components above the root do not count.
        assert!(!is_hidden(
            Path::new("/home/u/.config/origin"),
            Path::new("/home/u/.config/origin/config.json")
        ));
    }

    #[test]
    fn classifies_event_kinds() {
        use notify::event::{CreateKind, ModifyKind, RemoveKind};
        use notify::EventKind;

        let path = Path::new("docs/a.mdx");
        assert_eq!(
            classify_event(path, &EventKind::Create(CreateKind::File)),
            Some(WatchEvent::Created(path.to_path_buf()))
        );
        assert_eq!(
            classify_event(path, &EventKind::Modify(ModifyKind::Any)),
            Some(WatchEvent::Modified(path.to_path_buf()))
        );
        assert_eq!(
            classify_event(path, &EventKind::Remove(RemoveKind::File)),
            Some(WatchEvent::Deleted(path.to_path_buf()))
        );
        assert_eq!(classify_event(path, &EventKind::Any), None);
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let test_file = temp.path().join("test.mdx");

        // Create the watcher first (so it catches file creation)
        let (watcher, mut rx) = FileWatcher::new(temp.path()).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&test_file, "# Created").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        let event = event.unwrap().expect("channel should not be closed");
        assert!(event.path().ends_with("test.mdx"));
    }

    #[tokio::test]
    async fn skips_hidden_files() {
        let temp = tempdir().unwrap();
        let (_watcher, mut rx) = FileWatcher::new(temp.path()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(temp.path().join(".hidden"), "x").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        fs::write(temp.path().join("visible.json"), "{}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("timeout waiting for file watch event")
            .expect("channel should not be closed");

        assert!(event.path().ends_with("visible.json"));
    }
}
