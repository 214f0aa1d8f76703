//! Content pipeline for speed-docs.
//!
//! Validates a user's origin directory and mirrors it into a site template,
//! routing images into a flat public directory.

pub mod mirror;
pub mod output;
pub mod sync;
pub mod validate;

pub use mirror::{is_image, Mirror, MirrorError, MirrorReport, IMAGE_EXTENSIONS};
pub use output::{relocate_output, RelocateError, RelocationReport, OUTPUT_DIR};
pub use sync::{sync_content, ContentLayout, SyncError, SyncReport};
pub use validate::{validate_origin, ValidationError};
