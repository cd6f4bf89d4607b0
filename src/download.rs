//! Artifact download with streaming writes and progress reporting.
//!
//! The lifecycle engine only depends on the [`Fetcher`] trait: "fetch bytes
//! from a URL into a path, reporting progress as they arrive". [`HttpFetcher`]
//! is the production implementation backed by a shared `reqwest` client.

use crate::error::{Result, ToolboxError};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Progress callback: `(bytes_downloaded, expected_total)`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, Option<u64>);

/// Retrieves the bytes behind a URL into a local file.
pub trait Fetcher {
    /// Download `url` to `dest`, overwriting it, and return the number of
    /// bytes written. `on_progress` is called after every chunk.
    ///
    /// A failure part-way through may leave a partial file at `dest`.
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: ProgressFn<'_>,
    ) -> impl Future<Output = Result<u64>>;
}

/// HTTP(S) fetcher with connection reuse across downloads.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(format!("toolbox/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path, on_progress: ProgressFn<'_>) -> Result<u64> {
        let fail = |reason: String| ToolboxError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let total = response.content_length();
        let mut file = fs::File::create(dest).await?;
        let mut downloaded: u64 = 0;
        on_progress(0, total);

        while let Some(chunk) = response.chunk().await.map_err(|e| fail(e.to_string()))? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            on_progress(downloaded, total);
        }

        file.flush().await?;
        tracing::debug!("fetched {} bytes from {} to {}", downloaded, url, dest.display());

        Ok(downloaded)
    }
}

/// File name for a downloaded artifact: the package name plus the extension
/// of the URL's final path segment (query and fragment ignored).
pub fn artifact_file_name(package: &str, url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    match segment.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
            format!("{}.{}", package, extension)
        }
        _ => package.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(
            artifact_file_name("Notepad", "https://example.com/releases/notepad.exe"),
            "Notepad.exe"
        );
        assert_eq!(
            artifact_file_name("tool", "https://example.com/tool-1.2.zip"),
            "tool.zip"
        );
    }

    #[test]
    fn test_artifact_file_name_edge_cases() {
        assert_eq!(artifact_file_name("pkg", "https://example.com/download"), "pkg");
        assert_eq!(
            artifact_file_name("pkg", "https://example.com/a.tar.gz?token=1.2"),
            "pkg.gz"
        );
        assert_eq!(artifact_file_name("pkg", "https://example.com/.hidden"), "pkg");
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
    }
}
