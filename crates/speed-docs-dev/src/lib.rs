//! Development mode for speed-docs.
//!
//! Watches the origin directory, re-syncs content into the template on
//! every change, and runs the template's own dev server alongside.

pub mod process;
pub mod session;
pub mod watch_loop;
pub mod watcher;

pub use process::{PackageManager, ProcessError};
pub use session::{DevError, DevSession, DevSessionConfig};
pub use watch_loop::{SyncStatus, WatchLoop, WatchStats};
pub use watcher::{FileWatcher, WatchEvent};
