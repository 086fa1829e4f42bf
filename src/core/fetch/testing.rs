//! In-memory collaborators for the fetch step tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::api::{
    GameQuery, LatestGame, LatestGameResources, LatestLauncher, LatestLauncherExe, LauncherApi,
    LauncherExeQuery, LauncherQuery, Payload, ResourceQuery,
};
use crate::core::archive::ArchiveStore;
use crate::core::config::AppConfig;
use crate::core::downloader::AssetSource;
use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::state::RunContext;

/// `game/get_latest` body for a full build.
pub fn game_rsp(version: &str, token: &str, packs: &[(&str, &str)]) -> Value {
    let packs: Vec<Value> = packs
        .iter()
        .map(|(url, md5)| json!({"url": url, "md5": md5, "package_size": "100"}))
        .collect();
    json!({
        "action": 1,
        "version": version,
        "request_version": "",
        "pkg": {
            "packs": packs,
            "total_size": "1000",
            "file_path": format!("https://cdn.example.com/game/{}_{}/files", version, token),
            "url": "",
            "md5": "",
            "package_size": "0"
        },
        "patch": null,
        "state": 0
    })
}

/// `game/get_latest` body carrying a patch from `from` to `to`.
pub fn patch_rsp(from: &str, to: &str) -> Value {
    let mut rsp = game_rsp(to, "tok", &[]);
    rsp["request_version"] = json!(from);
    rsp["patch"] = json!({
        "url": "",
        "md5": "",
        "package_size": "0",
        "total_size": "500",
        "patches": [{
            "url": format!("https://cdn.example.com/patch/{}/{}/part.zip?auth_key=x", from, to),
            "md5": format!("patch-{}-{}", from, to),
            "package_size": "200"
        }]
    });
    rsp
}

#[derive(Default)]
pub struct FakeApi {
    pub game: Mutex<Value>,
    /// Patch responses keyed by the version patched from; others get `patch: null`.
    pub patches: Mutex<HashMap<String, Value>>,
    pub calls: Mutex<Vec<String>>,
    /// Serve launcher records without download URLs.
    pub blank_launcher_urls: Mutex<bool>,
}

impl FakeApi {
    pub fn with_game(game: Value) -> Self {
        Self {
            game: Mutex::new(game),
            ..Default::default()
        }
    }

    pub fn set_game(&self, game: Value) {
        *self.game.lock().unwrap() = game;
    }

    pub fn add_patch(&self, from: &str, to: &str) {
        self.patches
            .lock()
            .unwrap()
            .insert(from.to_string(), patch_rsp(from, to));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn launcher_url(&self, url: String) -> String {
        if *self.blank_launcher_urls.lock().unwrap() {
            String::new()
        } else {
            url
        }
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LauncherApi for FakeApi {
    async fn latest_game(&self, query: &GameQuery) -> ArchiveResult<Payload<LatestGame>> {
        let raw = match &query.version {
            None => {
                self.log(format!("game:{}", query.sub_channel));
                self.game.lock().unwrap().clone()
            }
            Some(from) => {
                self.log(format!("patch:{}", from));
                let current = self.game.lock().unwrap().clone();
                self.patches.lock().unwrap().get(from).cloned().unwrap_or(current)
            }
        };
        Payload::from_raw(raw)
    }

    async fn latest_game_resources(
        &self,
        query: &ResourceQuery,
    ) -> ArchiveResult<Payload<LatestGameResources>> {
        self.log(format!("res:{}:{}", query.platform, query.version));
        let base = format!(
            "https://res.example.com/{}/{}",
            query.platform, query.game_version
        );
        Payload::from_raw(json!({
            "resources": [
                {"name": "initial", "version": format!("i-{}", query.game_version), "path": format!("{}/initial", base)},
                {"name": "main", "version": format!("m-{}", query.game_version), "path": format!("{}/main", base)}
            ],
            "configs": "{\"kick_flag\": false}",
            "res_version": format!("r-{}", query.game_version)
        }))
    }

    async fn latest_launcher(
        &self,
        query: &LauncherQuery,
    ) -> ArchiveResult<Payload<LatestLauncher>> {
        self.log(format!("launcher:{}", query.target_app));
        Payload::from_raw(json!({
            "version": "1.0.0",
            "zip_package_url": self.launcher_url(format!(
                "https://launcher.example.com/{}/launcher.zip?auth_key=1",
                query.target_app
            )),
            "md5": format!("zip-{}", query.target_app),
            "package_size": "10",
            "total_size": "30"
        }))
    }

    async fn latest_launcher_exe(
        &self,
        query: &LauncherExeQuery,
    ) -> ArchiveResult<Payload<LatestLauncherExe>> {
        self.log(format!("launcherExe:{}", query.ta));
        Payload::from_raw(json!({
            "version": "1.0.0",
            "exe_url": self.launcher_url(format!(
                "https://launcher.example.com/{}/setup.exe?auth_key=1",
                query.ta
            )),
            "exe_size": "20"
        }))
    }
}

/// Serves `files`; URLs containing `broken` fail with HTTP 500, others are absent.
#[derive(Default)]
pub struct FakeAssets {
    pub files: HashMap<String, Vec<u8>>,
    pub requests: Mutex<Vec<String>>,
}

#[async_trait]
impl AssetSource for FakeAssets {
    async fn fetch_optional(&self, url: &str) -> ArchiveResult<Option<Vec<u8>>> {
        self.requests.lock().unwrap().push(url.to_string());
        if url.contains("broken") {
            return Err(ArchiveError::RequestFailed {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(self.files.get(url).cloned())
    }
}

/// Default configuration reduced to the official game target.
pub fn official_only_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.targets.games.truncate(1);
    config
}

pub fn context(root: &Path, config: AppConfig, api: Arc<FakeApi>) -> RunContext {
    context_with_assets(root, config, api, Arc::new(FakeAssets::default()))
}

pub fn context_with_assets(
    root: &Path,
    config: AppConfig,
    api: Arc<FakeApi>,
    assets: Arc<FakeAssets>,
) -> RunContext {
    RunContext::new(config, ArchiveStore::new(root), api, assets).unwrap()
}
