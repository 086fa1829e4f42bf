use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use tracing::{debug, info};

use super::targets::{GameTarget, LauncherApp, LauncherTarget, Platform, Region};
use crate::core::error::{ArchiveError, ArchiveResult};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub thread_count: ThreadCount,
    /// Top-level directory name under the output root.
    pub product: String,
    pub platforms: Vec<Platform>,
    pub targets: TargetsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub api: ApiConfig,
    pub user_agent: String,
    pub timeout_ms: u64,
    pub retry_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base: ApiHosts,
}

/// Base64 encoded `host/prefix` of the launcher API per region.
/// An empty string means the region is not configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHosts {
    pub launcher: String,
    pub launcher_cn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadCount {
    /// Upper limit of concurrent network requests in fan-out steps.
    pub network: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetsConfig {
    pub games: Vec<GameTarget>,
    pub launchers: Vec<LauncherTarget>,
}

const GAME_APP_CODE: &str = "YDUTE5gscDZ229CW";
const LAUNCHER_APP_CODE: &str = "TiaytKBUIEdoEwRT";
const LAUNCHER_APP_CODE_EPIC: &str = "BBWoqCzuZ2bZ1Dro";
const OS_CHANNEL: u32 = 6;

impl Default for AppConfig {
    fn default() -> Self {
        let game = |name: &str, launcher_app_code: &str, sub_channel: u32, mirror: bool| {
            GameTarget {
                name: name.to_string(),
                region: Region::Os,
                app_code: GAME_APP_CODE.to_string(),
                launcher_app_code: launcher_app_code.to_string(),
                channel: OS_CHANNEL,
                sub_channel,
                launcher_sub_channel: sub_channel,
                dir_name: sub_channel.to_string(),
                mirror,
            }
        };

        Self {
            network: NetworkConfig {
                api: ApiConfig {
                    base: ApiHosts {
                        launcher: "bGF1bmNoZXIuZ3J5cGhsaW5lLmNvbS9hcGk=".to_string(),
                        launcher_cn: String::new(),
                    },
                },
                user_agent: "Mozilla/5.0".to_string(),
                timeout_ms: 20_000,
                retry_count: 5,
            },
            thread_count: ThreadCount { network: 16 },
            product: "akEndfield".to_string(),
            platforms: Platform::ALL.to_vec(),
            targets: TargetsConfig {
                games: vec![
                    game("Official", LAUNCHER_APP_CODE, OS_CHANNEL, true),
                    game("Epic", LAUNCHER_APP_CODE_EPIC, 801, false),
                    // Google Play builds are served through the Epic launcher app code.
                    game("Google Play", LAUNCHER_APP_CODE_EPIC, 802, false),
                ],
                launchers: vec![LauncherTarget {
                    region: Region::Os,
                    app_code: LAUNCHER_APP_CODE.to_string(),
                    channel: OS_CHANNEL,
                    apps: vec![LauncherApp::EndField, LauncherApp::Official],
                }],
            },
        }
    }
}

impl AppConfig {
    /// Load `path`, deep-merged over the built-in defaults.
    ///
    /// The file is (re)written when missing or when merging added keys, so
    /// users always see the complete set of options.
    pub fn load(path: &Path) -> ArchiveResult<Self> {
        let defaults = serde_yaml::to_value(Self::default())?;

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ArchiveError::io(path, e)),
        };

        let merged = match &raw {
            Some(raw) => {
                let user: YamlValue = serde_yaml::from_str(raw)?;
                deep_merge(defaults, user)
            }
            None => defaults,
        };

        let config: AppConfig = serde_yaml::from_value(merged.clone())?;
        config.validate()?;

        let on_disk: Option<YamlValue> = raw.as_deref().map(serde_yaml::from_str).transpose()?;
        if on_disk.as_ref() != Some(&merged) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
            }
            std::fs::write(path, serde_yaml::to_string(&merged)?)
                .map_err(|e| ArchiveError::io(path, e))?;
            info!("Wrote merged configuration to {:?}", path);
        } else {
            debug!("Loaded configuration from {:?}", path);
        }

        Ok(config)
    }

    fn validate(&self) -> ArchiveResult<()> {
        if self.thread_count.network == 0 {
            return Err(ArchiveError::Config(
                "thread_count.network must be at least 1".into(),
            ));
        }
        for target in &self.targets.games {
            if target.dir_name.is_empty() {
                return Err(ArchiveError::Config(format!(
                    "game target '{}' has an empty dir_name",
                    target.name
                )));
            }
        }
        Ok(())
    }

    /// Decoded API base (`host/prefix`) for a region.
    pub fn api_base(&self, region: Region) -> ArchiveResult<String> {
        let encoded = match region {
            Region::Os => &self.network.api.base.launcher,
            Region::Cn => &self.network.api.base.launcher_cn,
        };
        if encoded.is_empty() {
            return Err(ArchiveError::Config(format!(
                "no launcher API base configured for region {}",
                region
            )));
        }
        let bytes = STANDARD.decode(encoded)?;
        String::from_utf8(bytes)
            .map_err(|e| ArchiveError::Config(format!("API base is not UTF-8: {}", e)))
    }
}

/// Recursively merge `overlay` into `base`. Mappings merge key by key;
/// every other value (sequences included) is replaced by the overlay.
pub fn deep_merge(base: YamlValue, overlay: YamlValue) -> YamlValue {
    match (base, overlay) {
        (YamlValue::Mapping(mut base_map), YamlValue::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => {
                        let current = std::mem::replace(existing, YamlValue::Null);
                        *existing = deep_merge(current, value);
                    }
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
            YamlValue::Mapping(base_map)
        }
        (base, YamlValue::Null) => base,
        (_, overlay) => overlay,
    }
}
