use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::client::{GameQuery, LauncherApi, LauncherExeQuery, LauncherQuery, ResourceQuery};
use super::types::{LatestGame, LatestGameResources, LatestLauncher, LatestLauncherExe, Payload};
use crate::core::config::{AppConfig, Region};
use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::http::{ensure_success, send_with_retry};
use crate::core::version::ensure_semver;

/// [`LauncherApi`] over HTTPS.
pub struct HttpLauncherApi {
    client: Client,
    base_os: Option<String>,
    base_cn: Option<String>,
    retries: u32,
}

impl HttpLauncherApi {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_os: config.api_base(Region::Os).ok(),
            base_cn: config.api_base(Region::Cn).ok(),
            retries: config.network.retry_count,
        }
    }

    fn base(&self, region: Region) -> ArchiveResult<&str> {
        let base = match region {
            Region::Os => &self.base_os,
            Region::Cn => &self.base_cn,
        };
        base.as_deref().ok_or_else(|| {
            ArchiveError::Config(format!("no launcher API base configured for region {}", region))
        })
    }

    async fn get_json(
        &self,
        region: Region,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ArchiveResult<Value> {
        let url = format!("https://{}/{}", self.base(region)?, endpoint);
        debug!("GET {} {:?}", url, params);

        let request = self.client.get(&url).query(params);
        let resp = ensure_success(send_with_retry(request, self.retries).await?)?;
        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl LauncherApi for HttpLauncherApi {
    async fn latest_game(&self, query: &GameQuery) -> ArchiveResult<Payload<LatestGame>> {
        if let Some(version) = &query.version {
            ensure_semver(version)?;
        }
        let mut params = vec![
            ("appcode", query.app_code.clone()),
            ("launcher_appcode", query.launcher_app_code.clone()),
            ("channel", query.channel.to_string()),
            ("sub_channel", query.sub_channel.to_string()),
            ("launcher_sub_channel", query.launcher_sub_channel.to_string()),
        ];
        if let Some(version) = &query.version {
            params.push(("version", version.clone()));
        }
        let raw = self.get_json(query.region, "game/get_latest", &params).await?;
        Payload::from_raw(raw)
    }

    async fn latest_game_resources(
        &self,
        query: &ResourceQuery,
    ) -> ArchiveResult<Payload<LatestGameResources>> {
        ensure_semver(&query.version)?;
        let params = [
            ("appcode", query.app_code.clone()),
            ("game_version", query.game_version.clone()),
            ("version", query.version.clone()),
            ("platform", query.platform.as_str().to_string()),
            ("rand_str", query.rand_str.clone()),
        ];
        let raw = self
            .get_json(query.region, "game/get_latest_resources", &params)
            .await?;
        Payload::from_raw(raw)
    }

    async fn latest_launcher(
        &self,
        query: &LauncherQuery,
    ) -> ArchiveResult<Payload<LatestLauncher>> {
        let params = [
            ("appcode", query.app_code.clone()),
            ("channel", query.channel.to_string()),
            ("sub_channel", query.sub_channel.to_string()),
            ("target_app", query.target_app.as_str().to_string()),
        ];
        let raw = self
            .get_json(query.region, "launcher/get_latest", &params)
            .await?;
        Payload::from_raw(raw)
    }

    async fn latest_launcher_exe(
        &self,
        query: &LauncherExeQuery,
    ) -> ArchiveResult<Payload<LatestLauncherExe>> {
        let params = [
            ("appcode", query.app_code.clone()),
            ("channel", query.channel.to_string()),
            ("sub_channel", query.sub_channel.to_string()),
            ("ta", query.ta.clone()),
        ];
        let raw = self
            .get_json(query.region, "launcher/get_latest_launcher", &params)
            .await?;
        Payload::from_raw(raw)
    }
}
