use async_trait::async_trait;
use serde::Serialize;

use super::types::{LatestGame, LatestGameResources, LatestLauncher, LatestLauncherExe, Payload};
use crate::core::config::{GameTarget, LauncherApp, LauncherTarget, Platform, Region};
use crate::core::error::ArchiveResult;

/// Parameters of a `game/get_latest` call. Serializes to the archived `req`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuery {
    #[serde(skip)]
    pub region: Region,
    pub app_code: String,
    pub launcher_app_code: String,
    pub channel: u32,
    pub sub_channel: u32,
    pub launcher_sub_channel: u32,
    /// Installed version to patch from; `None` asks for the full build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl GameQuery {
    pub fn latest(target: &GameTarget) -> Self {
        Self {
            region: target.region,
            app_code: target.app_code.clone(),
            launcher_app_code: target.launcher_app_code.clone(),
            channel: target.channel,
            sub_channel: target.sub_channel,
            launcher_sub_channel: target.launcher_sub_channel,
            version: None,
        }
    }

    pub fn patch_from(target: &GameTarget, version: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            ..Self::latest(target)
        }
    }
}

/// Parameters of a `game/get_latest_resources` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuery {
    #[serde(skip)]
    pub region: Region,
    pub app_code: String,
    /// `<major>.<minor>` of `version`.
    pub game_version: String,
    pub version: String,
    pub rand_str: String,
    pub platform: Platform,
}

/// Parameters of a `launcher/get_latest` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherQuery {
    #[serde(skip)]
    pub region: Region,
    pub app_code: String,
    pub channel: u32,
    pub sub_channel: u32,
    pub target_app: LauncherApp,
}

impl LauncherQuery {
    pub fn new(target: &LauncherTarget, app: LauncherApp) -> Self {
        Self {
            region: target.region,
            app_code: target.app_code.clone(),
            channel: target.channel,
            sub_channel: target.channel,
            target_app: app,
        }
    }
}

/// Parameters of a `launcher/get_latest_launcher` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherExeQuery {
    #[serde(skip)]
    pub region: Region,
    pub app_code: String,
    pub channel: u32,
    pub sub_channel: u32,
    /// Lower-cased launcher app name.
    pub ta: String,
}

impl LauncherExeQuery {
    pub fn new(target: &LauncherTarget, app: LauncherApp) -> Self {
        Self {
            region: target.region,
            app_code: target.app_code.clone(),
            channel: target.channel,
            sub_channel: target.channel,
            ta: app.as_str().to_lowercase(),
        }
    }
}

/// The remote launcher API.
///
/// "No patch" is not an error: `latest_game` with a version returns
/// `patch: None`. Transport failures and unexpected statuses are errors.
#[async_trait]
pub trait LauncherApi: Send + Sync {
    async fn latest_game(&self, query: &GameQuery) -> ArchiveResult<Payload<LatestGame>>;

    async fn latest_game_resources(
        &self,
        query: &ResourceQuery,
    ) -> ArchiveResult<Payload<LatestGameResources>>;

    async fn latest_launcher(&self, query: &LauncherQuery)
        -> ArchiveResult<Payload<LatestLauncher>>;

    async fn latest_launcher_exe(
        &self,
        query: &LauncherExeQuery,
    ) -> ArchiveResult<Payload<LatestLauncherExe>>;
}
