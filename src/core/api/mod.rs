pub mod client;
pub mod http_api;
pub mod types;

pub use client::{GameQuery, LauncherApi, LauncherExeQuery, LauncherQuery, ResourceQuery};
pub use http_api::HttpLauncherApi;
pub use types::{
    parse_size, GamePackage, GamePatch, LatestGame, LatestGameResources, LatestLauncher,
    LatestLauncherExe, PackFile, Payload, ResourceEntry,
};
