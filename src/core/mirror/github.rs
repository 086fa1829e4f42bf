use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde::Deserialize;
use tracing::info;

use super::dispatcher::MirrorSink;
use super::list::file_name;
use super::pending::MirrorRequest;
use crate::core::config::GithubAuth;
use crate::core::downloader::Downloader;
use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::http::ensure_success;

const API_BASE: &str = "https://api.github.com";
const UPLOAD_BASE: &str = "https://uploads.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Mirrors binaries as assets of one GitHub release.
pub struct GithubReleaseSink {
    downloader: Downloader,
    auth: GithubAuth,
}

impl GithubReleaseSink {
    pub fn new(downloader: Downloader, auth: GithubAuth) -> Self {
        Self { downloader, auth }
    }

    /// Public download URL of an asset of the configured release.
    pub fn asset_url(&self, name: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/download/{}/{}",
            self.auth.owner, self.auth.repo, self.auth.tag, name
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.auth.token))
            .header(ACCEPT, "application/vnd.github+json")
    }

    pub async fn release(&self) -> ArchiveResult<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            API_BASE, self.auth.owner, self.auth.repo, self.auth.tag
        );
        let resp = self
            .authorized(self.downloader.client().get(&url))
            .send()
            .await?;
        let resp = ensure_success(resp).map_err(|e| {
            ArchiveError::Mirror(format!("release {} not found: {}", self.auth.tag, e))
        })?;
        Ok(resp.json().await?)
    }

    /// Sum of all asset sizes in the release.
    pub async fn release_size(&self) -> ArchiveResult<u64> {
        Ok(self.release().await?.assets.iter().map(|a| a.size).sum())
    }
}

#[async_trait]
impl MirrorSink for GithubReleaseSink {
    async fn mirror(&self, request: &MirrorRequest) -> ArchiveResult<String> {
        let name = match &request.name {
            Some(name) => name.clone(),
            None => file_name(&request.url)?,
        };
        let release = self.release().await?;

        info!("Mirror archive: Downloading {} ...", name);
        let bytes = self
            .downloader
            .fetch_bytes(&request.url, request.checksum.as_deref())
            .await?;

        info!("Mirror archive: Uploading {} ...", name);
        let upload_url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            UPLOAD_BASE, self.auth.owner, self.auth.repo, release.id
        );
        let resp = self
            .authorized(self.downloader.client().post(&upload_url))
            .query(&[("name", name.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, bytes.len())
            .body(bytes)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ArchiveError::Mirror(format!(
                "upload of {} failed: HTTP {} {}",
                name, status, body
            )));
        }

        Ok(self.asset_url(&name))
    }
}
