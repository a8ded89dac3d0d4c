//! Image download
//!
//! `image` commands may reference a URL. The bytes are fetched, written to a
//! temporary `.jpg` file for the driver to load, and the file is removed as
//! soon as the command is done with it. The driver decodes by content, so
//! PNG or WebP bytes under the `.jpg` name print the same.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::{CleanupError, FetchError};

/// Fetches the bytes behind a URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP(S) fetcher with a request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        debug!(bytes = bytes.len(), "Image downloaded");
        Ok(bytes.to_vec())
    }
}

/// Downloaded bytes materialized as a temporary file
///
/// Call [`TempAsset::release`] when done; dropping the asset also removes
/// the file, but any error is lost.
#[derive(Debug)]
pub struct TempAsset {
    file: NamedTempFile,
}

impl TempAsset {
    pub fn write(bytes: &[u8]) -> Result<Self, FetchError> {
        let mut file = tempfile::Builder::new()
            .prefix("print-relay-")
            .suffix(".jpg")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file
    pub fn release(self) -> Result<(), CleanupError> {
        self.file.close().map_err(CleanupError::TempFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_asset_lifecycle() {
        let asset = TempAsset::write(b"\xFF\xD8\xFF").unwrap();
        let path = asset.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\xFF\xD8\xFF");

        asset.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_asset_removed_on_drop() {
        let asset = TempAsset::write(b"x").unwrap();
        let path = asset.path().to_path_buf();
        drop(asset);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unreachable_url_is_request_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/logo.png").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
