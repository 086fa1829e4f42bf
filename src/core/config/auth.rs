use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ArchiveError, ArchiveResult};

pub const DEFAULT_AUTH_CONFIG_PATH: &str = "config/config_auth.yaml";

/// Credentials for the mirror sinks. Kept out of `config.yaml` so that file
/// can be committed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub github: Option<GithubAuth>,
    #[serde(default)]
    pub wayback: Option<WaybackAuth>,
}

/// Release used as binary mirror: assets land in `owner/repo` under `tag`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubAuth {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub tag: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WaybackAuth {
    pub username: String,
    pub password: String,
}

// Keep secrets out of debug logs.
impl std::fmt::Debug for GithubAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubAuth")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for WaybackAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaybackAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Load credentials; a missing file means no sink is configured.
    pub fn load(path: &Path) -> ArchiveResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_yaml::from_str::<Option<AuthConfig>>(&raw)?.unwrap_or_default()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ArchiveError::io(path, e)),
        }
    }
}
