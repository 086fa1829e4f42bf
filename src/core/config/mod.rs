pub mod app_config;
pub mod auth;
pub mod targets;

pub use app_config::{AppConfig, DEFAULT_CONFIG_PATH};
pub use auth::{AuthConfig, GithubAuth, WaybackAuth, DEFAULT_AUTH_CONFIG_PATH};
pub use targets::{GameTarget, LauncherApp, LauncherTarget, Platform, Region, ResourceTarget};
