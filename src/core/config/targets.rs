use serde::{Deserialize, Serialize};

/// Distribution region; selects the API base host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Os,
    Cn,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Os => "os",
            Region::Cn => "cn",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Platforms a resource manifest is published for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    PlayStation,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Windows,
        Platform::Android,
        Platform::Ios,
        Platform::PlayStation,
    ];

    /// Name used both as query parameter and directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::PlayStation => "PlayStation",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Launcher application flavours served from the same launcher endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LauncherApp {
    EndField,
    Arknights,
    Official,
}

impl LauncherApp {
    pub fn as_str(self) -> &'static str {
        match self {
            LauncherApp::EndField => "EndField",
            LauncherApp::Arknights => "Arknights",
            LauncherApp::Official => "Official",
        }
    }
}

impl std::fmt::Display for LauncherApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pollable game distribution stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTarget {
    pub name: String,
    pub region: Region,
    pub app_code: String,
    pub launcher_app_code: String,
    pub channel: u32,
    pub sub_channel: u32,
    pub launcher_sub_channel: u32,
    /// Directory key under `game/`.
    pub dir_name: String,
    /// Forward newly seen packages of this target to the mirror sinks.
    #[serde(default)]
    pub mirror: bool,
}

impl GameTarget {
    pub fn resource_key(&self) -> ResourceTarget {
        ResourceTarget {
            region: self.region,
            app_code: self.app_code.clone(),
            channel: self.channel,
        }
    }
}

/// Resource manifests only depend on region, game app code and channel, so
/// several game targets collapse onto one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceTarget {
    pub region: Region,
    pub app_code: String,
    pub channel: u32,
}

impl ResourceTarget {
    /// Distinct resource targets in first-seen order.
    pub fn collect(games: &[GameTarget]) -> Vec<ResourceTarget> {
        let mut out: Vec<ResourceTarget> = Vec::new();
        for key in games.iter().map(GameTarget::resource_key) {
            if !out.contains(&key) {
                out.push(key);
            }
        }
        out
    }

    /// Directory key of the game history the manifests are derived from.
    pub fn game_dir(&self) -> String {
        self.channel.to_string()
    }
}

/// A launcher distribution point serving one or more launcher apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherTarget {
    pub region: Region,
    pub app_code: String,
    pub channel: u32,
    pub apps: Vec<LauncherApp>,
}
