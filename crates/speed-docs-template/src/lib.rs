//! Template download and caching for speed-docs.
//!
//! A site template is fetched as a tarball, unpacked to a temporary
//! directory, and kept in a single-slot cache between runs.

pub mod cache;
pub mod fetch;
pub mod source;

pub use cache::{CacheError, TemplateCache, SENTINEL_FILES};
pub use fetch::{
    unpack_template, FetchError, TemplateFetcher, DEFAULT_TEMPLATE_SUBDIR, DEFAULT_TEMPLATE_URL,
};
pub use source::{FetchedTemplate, TemplateSource};
