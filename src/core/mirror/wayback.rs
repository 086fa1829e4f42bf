use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::dispatcher::ArchivalSink;
use crate::core::config::WaybackAuth;
use crate::core::error::{ArchiveError, ArchiveResult};
use crate::core::http::ensure_success;
use crate::core::report::format_bytes;

const LOGIN_URL: &str = "https://archive.org/services/account/login/";
const SAVE_URL: &str = "https://web.archive.org/save/";
const STATUS_URL: &str = "https://web.archive.org/save/status/";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

fn job_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"spn\.watchJob\("([^"]+)""#).expect("valid job id pattern"))
}

/// Session cookies of a logged-in archive.org account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: String,
    sig: String,
}

impl Session {
    fn cookie_header(&self) -> String {
        format!("logged-in-sig={}; logged-in-user={}", self.sig, self.user)
    }
}

/// `name=value` of the first `Set-Cookie` header named `name`.
fn cookie_value(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
}

/// Extract the save job id from the save page HTML.
pub fn parse_job_id(html: &str) -> ArchiveResult<String> {
    job_id_regex()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ArchiveError::WebArchive("save job id not found".into()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveStatus {
    pub status: String,
    #[serde(default)]
    pub download_size: Option<u64>,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SaveStatus {
    /// `Ok(true)` while the job is still running, `Ok(false)` once it has
    /// succeeded. Any other status is a failed job.
    pub fn is_pending(&self) -> ArchiveResult<bool> {
        match self.status.as_str() {
            "pending" => Ok(true),
            "success" => Ok(false),
            other => Err(ArchiveError::WebArchive(format!(
                "save job {}: {}",
                other,
                self.message.as_deref().unwrap_or("no message")
            ))),
        }
    }

    /// Snapshot URL of a finished job.
    pub fn archived_url(&self) -> ArchiveResult<String> {
        if let Some(status) = self.http_status.filter(|s| *s >= 400) {
            return Err(ArchiveError::WebArchive(format!("save: http {} error", status)));
        }
        match (&self.timestamp, &self.original_url) {
            (Some(ts), Some(orig)) => Ok(format!("https://web.archive.org/web/{}/{}", ts, orig)),
            _ => Err(ArchiveError::WebArchive(
                "finished job without timestamp or original_url".into(),
            )),
        }
    }
}

/// Wayback Machine "Save Page Now" client.
pub struct WaybackSink {
    client: Client,
    auth: WaybackAuth,
    session: Mutex<Option<Session>>,
}

impl WaybackSink {
    pub fn new(client: Client, auth: WaybackAuth) -> Self {
        Self {
            client,
            auth,
            session: Mutex::new(None),
        }
    }

    async fn login(&self) -> ArchiveResult<Session> {
        let token_rsp: Value = ensure_success(self.client.get(LOGIN_URL).send().await?)?
            .json()
            .await?;
        let token = token_rsp
            .pointer("/value/token")
            .and_then(Value::as_str)
            .ok_or_else(|| ArchiveError::WebArchive("failed to get login token".into()))?
            .to_string();

        let resp = self
            .client
            .post(LOGIN_URL)
            .json(&json!({
                "username": self.auth.username,
                "password": self.auth.password,
                "remember": "true",
                "t": token,
            }))
            .send()
            .await?;
        let resp = ensure_success(resp)?;
        let user = cookie_value(&resp, "logged-in-user");
        let sig = cookie_value(&resp, "logged-in-sig");
        let body: Value = resp.json().await?;
        if body.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(ArchiveError::WebArchive("login rejected".into()));
        }

        match (user, sig) {
            (Some(user), Some(sig)) => Ok(Session { user, sig }),
            _ => Err(ArchiveError::WebArchive("auth error: session cookies missing".into())),
        }
    }

    /// Logged-in session, created on first use.
    async fn session(&self) -> ArchiveResult<Session> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        let session = self.login().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn submit(&self, url: &str, session: &Session) -> ArchiveResult<String> {
        let resp = self
            .client
            .post(format!("{}{}", SAVE_URL, url))
            .header(COOKIE, session.cookie_header())
            .form(&[("url", url), ("capture_all", "on")])
            .send()
            .await?;
        let html = ensure_success(resp)?.text().await?;
        parse_job_id(&html)
    }

    async fn poll(&self, job_id: &str, session: &Session) -> ArchiveResult<SaveStatus> {
        loop {
            let resp = self
                .client
                .get(format!("{}{}", STATUS_URL, job_id))
                .header(COOKIE, session.cookie_header())
                .send()
                .await?;
            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(ArchiveError::WebArchive(format!(
                    "save: HTTP {}: {}",
                    status, body
                )));
            }
            let status: SaveStatus = resp.json().await?;
            if let (Some(done), Some(total)) = (status.download_size, status.total_size) {
                debug!(
                    "Wayback Machine save: {} / {}",
                    format_bytes(done),
                    format_bytes(total)
                );
            }
            if !status.is_pending()? {
                return Ok(status);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl ArchivalSink for WaybackSink {
    async fn archive(&self, url: &str) -> ArchiveResult<String> {
        let session = self.session().await?;
        info!("Wayback Machine: saving {}", url);
        let job_id = self.submit(url, &session).await?;
        self.poll(&job_id, &session).await?.archived_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_scraped_from_save_page() {
        let html = r#"<script>spn.watchJob("spn2-0123abcd", "/_static/", 6000);</script>"#;
        assert_eq!(parse_job_id(html).unwrap(), "spn2-0123abcd");
        assert!(parse_job_id("<html></html>").is_err());
    }

    #[test]
    fn finished_status_builds_snapshot_url() {
        let status: SaveStatus = serde_json::from_str(
            r#"{"status": "success", "job_id": "j", "timestamp": "20250101000000",
                "original_url": "https://cdn/l.exe", "http_status": 200}"#,
        )
        .unwrap();
        assert_eq!(
            status.archived_url().unwrap(),
            "https://web.archive.org/web/20250101000000/https://cdn/l.exe"
        );
    }

    #[test]
    fn upstream_error_status_fails_the_save() {
        let status: SaveStatus = serde_json::from_str(
            r#"{"status": "success", "timestamp": "1", "original_url": "u", "http_status": 404}"#,
        )
        .unwrap();
        assert!(matches!(status.archived_url(), Err(ArchiveError::WebArchive(_))));
    }

    #[test]
    fn only_pending_jobs_keep_polling() {
        let pending: SaveStatus =
            serde_json::from_str(r#"{"status": "pending", "job_id": "j"}"#).unwrap();
        assert!(pending.is_pending().unwrap());

        let done: SaveStatus = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(!done.is_pending().unwrap());
    }

    #[test]
    fn failed_job_ends_polling_with_its_message() {
        let failed: SaveStatus = serde_json::from_str(
            r#"{"status": "error", "job_id": "j", "message": "Cannot resolve host"}"#,
        )
        .unwrap();
        match failed.is_pending() {
            Err(ArchiveError::WebArchive(msg)) => assert!(msg.contains("Cannot resolve host")),
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }
}
