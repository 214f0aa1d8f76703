//! Template download over HTTP.
//!
//! The template ships as a gzip-compressed tarball of a whole repository;
//! the site scaffold sits at a fixed sub-path inside it.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::source::{FetchedTemplate, TemplateSource};

/// Default template archive.
pub const DEFAULT_TEMPLATE_URL: &str =
    "https://github.com/nicnocquee/speed-docs/archive/refs/heads/main.tar.gz";

/// Location of the template inside the default archive.
pub const DEFAULT_TEMPLATE_SUBDIR: &str = "speed-docs-main/apps/template-fumadocs-static";

const ARCHIVE_NAME: &str = "template.tar.gz";

/// Errors that can occur while fetching a template.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to download template from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download template from {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to create working directory: {0}")]
    Workdir(#[source] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract {path}: {source}")]
    Unpack {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template extraction failed - template directory not found: {0}")]
    SubtreeMissing(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Downloads and unpacks a template archive.
#[derive(Debug, Clone)]
pub struct TemplateFetcher {
    url: String,
    subdir: String,
    temp_root: Option<PathBuf>,
    client: reqwest::Client,
}

impl TemplateFetcher {
    /// Create a fetcher for `url`, locating the default template subtree.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subdir: DEFAULT_TEMPLATE_SUBDIR.to_string(),
            temp_root: None,
            client: reqwest::Client::new(),
        }
    }

    /// Locate the template at `subdir` inside the archive instead.
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = subdir.into();
        self
    }

    /// Create working directories under `dir` instead of the system
    /// temporary directory.
    pub fn with_temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(dir.into());
        self
    }

    /// Archive URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn download(&self, archive_path: &Path) -> Result<(), FetchError> {
        tracing::info!("Downloading template from: {}", self.url);

        let request_err = |e: reqwest::Error| FetchError::Request {
            url: self.url.clone(),
            source: e,
        };

        let response = self.client.get(&self.url).send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(request_err)?;
        tokio::fs::write(archive_path, &bytes)
            .await
            .map_err(|e| FetchError::Write {
                path: archive_path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Template downloaded successfully ({} bytes)", bytes.len());
        Ok(())
    }
}

impl Default for TemplateFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_URL)
    }
}

impl TemplateSource for TemplateFetcher {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<FetchedTemplate, FetchError> {
        // Dropping `workdir` on any early return cleans it up.
        let mut builder = tempfile::Builder::new();
        builder.prefix("speed-docs-");
        let workdir = match &self.temp_root {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
        .map_err(FetchError::Workdir)?;
        let archive_path = workdir.path().join(ARCHIVE_NAME);

        self.download(&archive_path).await?;

        tracing::info!("Extracting template...");
        let (archive, into, subdir) = (
            archive_path.clone(),
            workdir.path().to_path_buf(),
            self.subdir.clone(),
        );
        let root = tokio::task::spawn_blocking(move || unpack_template(&archive, &into, &subdir))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))??;

        discard_archive(&archive_path).await;

        tracing::info!("Template extracted successfully");
        Ok(FetchedTemplate::new(workdir, root))
    }
}

/// Remove a downloaded archive. Failure only costs disk space until the
/// working directory goes away, so it is logged rather than returned.
async fn discard_archive(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Failed to remove {}: {}", path.display(), e);
    }
}

/// Unpack a `.tar.gz` archive into `into` and return `into/subdir`.
///
/// Fails with [`FetchError::SubtreeMissing`] when the archive does not
/// contain `subdir`.
pub fn unpack_template(archive: &Path, into: &Path, subdir: &str) -> Result<PathBuf, FetchError> {
    let unpack_err = |e: std::io::Error| FetchError::Unpack {
        path: archive.to_path_buf(),
        source: e,
    };

    let file = File::open(archive).map_err(unpack_err)?;
    Archive::new(GzDecoder::new(file))
        .unpack(into)
        .map_err(unpack_err)?;

    let root = into.join(subdir);
    if !root.is_dir() {
        return Err(FetchError::SubtreeMissing(subdir.to_string()));
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn tarball(files: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Serve a single HTTP response on a local port and return its URL.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/main.tar.gz", addr)
    }

    #[test]
    fn unpacks_template_subtree() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join(ARCHIVE_NAME);
        fs::write(
            &archive,
            tarball(&[
                ("repo-main/apps/site/package.json", b"{}"),
                ("repo-main/README.md", b"# repo"),
            ]),
        )
        .unwrap();

        let root = unpack_template(&archive, temp.path(), "repo-main/apps/site").unwrap();

        assert_eq!(root, temp.path().join("repo-main/apps/site"));
        assert!(root.join("package.json").exists());
    }

    #[test]
    fn reports_missing_subtree() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join(ARCHIVE_NAME);
        fs::write(&archive, tarball(&[("other/file.txt", b"x")])).unwrap();

        let err = unpack_template(&archive, temp.path(), "repo-main/apps/site").unwrap_err();
        assert!(matches!(err, FetchError::SubtreeMissing(_)));
    }

    #[test]
    fn rejects_corrupt_archive() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join(ARCHIVE_NAME);
        fs::write(&archive, b"definitely not gzip").unwrap();

        let err = unpack_template(&archive, temp.path(), "site").unwrap_err();
        assert!(matches!(err, FetchError::Unpack { .. }));
    }

    #[tokio::test]
    async fn fetches_and_drops_archive() {
        let body = tarball(&[("repo-main/site/package.json", b"{\"name\":\"t\"}")]);
        let url = serve_once("200 OK", body).await;

        let fetched = TemplateFetcher::new(url)
            .with_subdir("repo-main/site")
            .fetch()
            .await
            .unwrap();

        assert!(fetched.root().join("package.json").exists());
        assert!(!fetched.workdir().join(ARCHIVE_NAME).exists());

        let workdir = fetched.workdir().to_path_buf();
        drop(fetched);
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn fails_on_error_status() {
        let url = serve_once("404 Not Found", Vec::new()).await;

        let err = TemplateFetcher::new(url).fetch().await.unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn removes_workdir_when_subtree_missing() {
        let temp_root = tempfile::tempdir().unwrap();
        let body = tarball(&[("repo-main/other/package.json", b"{}")]);
        let url = serve_once("200 OK", body).await;

        let err = TemplateFetcher::new(url)
            .with_subdir("repo-main/site")
            .with_temp_root(temp_root.path())
            .fetch()
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::SubtreeMissing(_)));
        assert_eq!(fs::read_dir(temp_root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn removes_workdir_on_error_status() {
        let temp_root = tempfile::tempdir().unwrap();
        let url = serve_once("500 Internal Server Error", Vec::new()).await;

        let err = TemplateFetcher::new(url)
            .with_temp_root(temp_root.path())
            .fetch()
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { .. }));
        assert_eq!(fs::read_dir(temp_root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_archive_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join(ARCHIVE_NAME);

        discard_archive(&archive).await;

        assert!(!archive.exists());
    }
}
