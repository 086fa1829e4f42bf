// ─── Launcher API payloads ───
// Typed views over the raw responses. The raw JSON is what gets archived;
// these structs are only used to navigate it.

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::ArchiveResult;

/// Raw response plus its typed view.
#[derive(Debug, Clone)]
pub struct Payload<T> {
    pub raw: Value,
    pub body: T,
}

impl<T: serde::de::DeserializeOwned> Payload<T> {
    pub fn from_raw(raw: Value) -> ArchiveResult<Self> {
        let body = serde_json::from_value(raw.clone())?;
        Ok(Self { raw, body })
    }
}

/// Sizes are sent as decimal strings.
pub fn parse_size(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PackFile {
    pub url: String,
    pub md5: String,
    #[serde(default)]
    pub package_size: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamePackage {
    #[serde(default)]
    pub packs: Vec<PackFile>,
    #[serde(default)]
    pub total_size: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub md5: String,
    #[serde(default)]
    pub package_size: String,
}

impl GamePackage {
    pub fn packed_size(&self) -> u64 {
        self.packs.iter().map(|p| parse_size(&p.package_size)).sum()
    }

    pub fn unpacked_size(&self) -> u64 {
        parse_size(&self.total_size).saturating_sub(self.packed_size())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamePatch {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub md5: String,
    #[serde(default)]
    pub package_size: String,
    #[serde(default)]
    pub total_size: String,
    #[serde(default)]
    pub patches: Vec<PackFile>,
}

impl GamePatch {
    pub fn packed_size(&self) -> u64 {
        self.patches.iter().map(|p| parse_size(&p.package_size)).sum()
    }

    pub fn unpacked_size(&self) -> u64 {
        parse_size(&self.total_size).saturating_sub(self.packed_size())
    }
}

/// `game/get_latest`. With a `version` query the response carries the patch
/// from that version to the latest one, or `patch: null` when there is none.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LatestGame {
    pub version: String,
    #[serde(default)]
    pub request_version: String,
    pub pkg: GamePackage,
    #[serde(default)]
    pub patch: Option<GamePatch>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResourceEntry {
    pub name: String,
    pub version: String,
    pub path: String,
}

/// `game/get_latest_resources`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LatestGameResources {
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    /// JSON document encoded as a string.
    #[serde(default)]
    pub configs: String,
    pub res_version: String,
}

impl LatestGameResources {
    pub fn resource(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// `kick_flag` from the embedded configs document.
    pub fn kick_flag(&self) -> bool {
        serde_json::from_str::<Value>(&self.configs)
            .ok()
            .and_then(|v| v.get("kick_flag").and_then(Value::as_bool))
            .unwrap_or(false)
    }
}

/// `launcher/get_latest`: the zipped launcher package.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LatestLauncher {
    pub version: String,
    pub zip_package_url: String,
    #[serde(default)]
    pub md5: String,
    #[serde(default)]
    pub package_size: String,
    #[serde(default)]
    pub total_size: String,
}

/// `launcher/get_latest_launcher`: the launcher installer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LatestLauncherExe {
    pub version: String,
    pub exe_url: String,
    #[serde(default)]
    pub exe_size: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn latest_game_sizes_are_derived_from_string_fields() {
        let payload: Payload<LatestGame> = Payload::from_raw(json!({
            "action": 1,
            "version": "1.0.14",
            "request_version": "",
            "pkg": {
                "packs": [
                    {"url": "https://x/a.zip", "md5": "m1", "package_size": "100"},
                    {"url": "https://x/b.zip", "md5": "m2", "package_size": "50"}
                ],
                "total_size": "1000",
                "file_path": "https://x/files/6_abcDEF/base",
                "url": "",
                "md5": "",
                "package_size": "0"
            },
            "patch": null,
            "state": 0
        }))
        .unwrap();

        assert_eq!(payload.body.pkg.packed_size(), 150);
        assert_eq!(payload.body.pkg.unpacked_size(), 850);
        assert!(payload.body.patch.is_none());
        assert_eq!(payload.raw["action"], 1);
    }

    #[test]
    fn kick_flag_reads_embedded_configs() {
        let res: LatestGameResources = serde_json::from_value(json!({
            "resources": [{"name": "main", "version": "v1", "path": "https://r/main"}],
            "configs": "{\"kick_flag\": true}",
            "res_version": "r1"
        }))
        .unwrap();
        assert!(res.kick_flag());
        assert_eq!(res.resource("main").unwrap().version, "v1");
        assert!(res.resource("initial").is_none());
    }
}
