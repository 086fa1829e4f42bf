use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::core::api::{
    GameQuery, LatestGame, LatestGameResources, LatestLauncher, LatestLauncherExe, LauncherApi,
    LauncherExeQuery, LauncherQuery, Payload, ResourceQuery,
};
use crate::core::archive::ArchiveStore;
use crate::core::config::AppConfig;
use crate::core::diff::{default_ignore_rules, IgnoreRule};
use crate::core::downloader::AssetSource;
use crate::core::error::ArchiveResult;
use crate::core::mirror::{MirrorRequest, PendingMirrors};

/// Everything one archive run shares between its steps.
///
/// The request cache and the pending-mirror list are the only mutable state;
/// both sit behind a std mutex that is never held across an `.await`.
pub struct RunContext {
    pub config: AppConfig,
    pub store: ArchiveStore,
    api: Arc<dyn LauncherApi>,
    assets: Arc<dyn AssetSource>,
    rules: Vec<IgnoreRule>,
    cache: Mutex<HashMap<String, Value>>,
    pending: Mutex<PendingMirrors>,
}

impl RunContext {
    pub fn new(
        config: AppConfig,
        store: ArchiveStore,
        api: Arc<dyn LauncherApi>,
        assets: Arc<dyn AssetSource>,
    ) -> ArchiveResult<Self> {
        Ok(Self {
            config,
            store,
            api,
            assets,
            rules: default_ignore_rules()?,
            cache: Mutex::new(HashMap::new()),
            pending: Mutex::new(PendingMirrors::new()),
        })
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn assets(&self) -> &dyn AssetSource {
        self.assets.as_ref()
    }

    pub fn product(&self) -> &str {
        &self.config.product
    }

    /// Width of the bounded fan-out pools.
    pub fn concurrency(&self) -> usize {
        self.config.thread_count.network.max(1)
    }

    // ── Pending mirrors ─────────────────────────────────

    fn pending(&self) -> MutexGuard<'_, PendingMirrors> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn enqueue_binary(&self, request: MirrorRequest) -> ArchiveResult<bool> {
        self.pending().push_binary(request)
    }

    pub fn enqueue_web_page(&self, url: &str) {
        self.pending().push_web_page(url);
    }

    /// Hand over everything collected so far.
    pub fn take_pending(&self) -> PendingMirrors {
        std::mem::take(&mut *self.pending())
    }

    // ── Cached API calls ────────────────────────────────

    fn cache_key(endpoint: &str, region: &str, query: &impl Serialize) -> ArchiveResult<String> {
        Ok(format!("{}|{}|{}", endpoint, region, serde_json::to_string(query)?))
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> ArchiveResult<Option<Payload<T>>> {
        let hit = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned();
        match hit {
            Some(raw) => {
                debug!("Request cache hit: {}", key);
                Payload::from_raw(raw).map(Some)
            }
            None => Ok(None),
        }
    }

    fn remember<T>(&self, key: String, payload: &Payload<T>) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, payload.raw.clone());
    }

    pub async fn latest_game(&self, query: &GameQuery) -> ArchiveResult<Payload<LatestGame>> {
        let key = Self::cache_key("game/get_latest", query.region.as_str(), query)?;
        if let Some(hit) = self.cached(&key)? {
            return Ok(hit);
        }
        let payload = self.api.latest_game(query).await?;
        self.remember(key, &payload);
        Ok(payload)
    }

    pub async fn latest_game_resources(
        &self,
        query: &ResourceQuery,
    ) -> ArchiveResult<Payload<LatestGameResources>> {
        let key = Self::cache_key("game/get_latest_resources", query.region.as_str(), query)?;
        if let Some(hit) = self.cached(&key)? {
            return Ok(hit);
        }
        let payload = self.api.latest_game_resources(query).await?;
        self.remember(key, &payload);
        Ok(payload)
    }

    pub async fn latest_launcher(
        &self,
        query: &LauncherQuery,
    ) -> ArchiveResult<Payload<LatestLauncher>> {
        let key = Self::cache_key("launcher/get_latest", query.region.as_str(), query)?;
        if let Some(hit) = self.cached(&key)? {
            return Ok(hit);
        }
        let payload = self.api.latest_launcher(query).await?;
        self.remember(key, &payload);
        Ok(payload)
    }

    pub async fn latest_launcher_exe(
        &self,
        query: &LauncherExeQuery,
    ) -> ArchiveResult<Payload<LatestLauncherExe>> {
        let key = Self::cache_key("launcher/get_latest_launcher", query.region.as_str(), query)?;
        if let Some(hit) = self.cached(&key)? {
            return Ok(hit);
        }
        let payload = self.api.latest_launcher_exe(query).await?;
        self.remember(key, &payload);
        Ok(payload)
    }
}
