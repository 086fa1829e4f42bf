use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the archiver.
/// Every module returns `Result<T, ArchiveError>`.
#[derive(Debug, Error)]
pub enum ArchiveError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed for {url}: HTTP {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ── Integrity ───────────────────────────────────────
    #[error("MD5 mismatch for {url}: expected {expected}, got {actual}")]
    Md5Mismatch {
        url: String,
        expected: String,
        actual: String,
    },

    // ── Serialization ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ── Configuration ───────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid base64 host: {0}")]
    Base64(#[from] base64::DecodeError),

    // ── Upstream contract ───────────────────────────────
    #[error("Invalid version string ({0})")]
    InvalidVersion(String),

    #[error("Upstream format changed: {0}")]
    SchemaDrift(String),

    // ── Sinks ───────────────────────────────────────────
    #[error("Mirror upload failed: {0}")]
    Mirror(String),

    #[error("Wayback Machine: {0}")]
    WebArchive(String),
}

/// Convenience alias used throughout the crate.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl From<std::io::Error> for ArchiveError {
    fn from(source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl ArchiveError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status the upstream answered with, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArchiveError::RequestFailed { status, .. } => Some(*status),
            ArchiveError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
