use async_trait::async_trait;
use md5::{Digest, Md5};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::http::{ensure_success, send_with_retry};

/// Lower-case hex MD5 of `bytes`.
pub fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Download of files that may legitimately be missing upstream.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Body of `url`, or `None` when the server answers 403 or 404.
    async fn fetch_optional(&self, url: &str) -> ArchiveResult<Option<Vec<u8>>>;
}

/// MD5 validated downloader.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    retries: u32,
}

impl Downloader {
    pub fn new(client: Client, retries: u32) -> Self {
        Self { client, retries }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // ── In-memory download ──────────────────────────────

    /// Fetch `url` into memory, validating the MD5 when one is expected.
    pub async fn fetch_bytes(&self, url: &str, md5_expected: Option<&str>) -> ArchiveResult<Vec<u8>> {
        let resp = send_with_retry(self.client.get(url), self.retries).await?;
        let bytes = ensure_success(resp)?.bytes().await?.to_vec();

        if let Some(expected) = md5_expected.filter(|m| !m.is_empty()) {
            let actual = md5_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ArchiveError::Md5Mismatch {
                    url: url.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        debug!("Downloaded: {} ({} bytes)", url, bytes.len());
        Ok(bytes)
    }
}

#[async_trait]
impl AssetSource for Downloader {
    async fn fetch_optional(&self, url: &str) -> ArchiveResult<Option<Vec<u8>>> {
        let resp = send_with_retry(self.client.get(url), self.retries).await?;
        match resp.status() {
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!("Not found: {} (HTTP {})", url, resp.status().as_u16());
                Ok(None)
            }
            _ => Ok(Some(ensure_success(resp)?.bytes().await?.to_vec())),
        }
    }
}
