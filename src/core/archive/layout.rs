//! On-disk layout below the output root.

use crate::core::config::{LauncherApp, Platform};

pub const PATCH_HISTORY_FILE: &str = "all_patch.json";
pub const RAW_DIR: &str = "raw";

/// The two launcher artifacts tracked per app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKind {
    /// Zipped launcher package (`launcher/get_latest`).
    Zip,
    /// Launcher installer (`launcher/get_latest_launcher`).
    Exe,
}

impl LauncherKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            LauncherKind::Zip => "launcher",
            LauncherKind::Exe => "launcherExe",
        }
    }
}

fn launcher_root(product: &str) -> Vec<String> {
    vec![product.to_string(), "launcher".to_string()]
}

/// `<product>/launcher/game/<dir>`
pub fn game_dir(product: &str, dir_name: &str) -> Vec<String> {
    let mut path = launcher_root(product);
    path.extend(["game".to_string(), dir_name.to_string()]);
    path
}

/// `<product>/launcher/game_resources/<channel>`
pub fn game_resources_root(product: &str, channel: u32) -> Vec<String> {
    let mut path = launcher_root(product);
    path.extend(["game_resources".to_string(), channel.to_string()]);
    path
}

/// `<product>/launcher/game_resources/<channel>/<platform>`
pub fn game_resources_dir(product: &str, channel: u32, platform: Platform) -> Vec<String> {
    let mut path = game_resources_root(product, channel);
    path.push(platform.as_str().to_string());
    path
}

/// `<product>/launcher/<launcher|launcherExe>`
pub fn launcher_kind_root(product: &str, kind: LauncherKind) -> Vec<String> {
    let mut path = launcher_root(product);
    path.push(kind.dir_name().to_string());
    path
}

/// `<product>/launcher/<launcher|launcherExe>/<App>/<channel>`
pub fn launcher_dir(product: &str, kind: LauncherKind, app: LauncherApp, channel: u32) -> Vec<String> {
    let mut path = launcher_kind_root(product, kind);
    path.extend([app.as_str().to_string(), channel.to_string()]);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_archive_layout() {
        assert_eq!(game_dir("akEndfield", "6").join("/"), "akEndfield/launcher/game/6");
        assert_eq!(
            game_resources_dir("akEndfield", 6, Platform::Ios).join("/"),
            "akEndfield/launcher/game_resources/6/iOS"
        );
        assert_eq!(
            launcher_dir("akEndfield", LauncherKind::Exe, LauncherApp::EndField, 6).join("/"),
            "akEndfield/launcher/launcherExe/EndField/6"
        );
    }
}
