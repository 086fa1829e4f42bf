use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::core::config::app_config::NetworkConfig;
use crate::core::error::{ArchiveError, ArchiveResult};

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub fn build_http_client(network: &NetworkConfig) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(network.user_agent.as_str())
        .default_headers(default_headers)
        .timeout(Duration::from_millis(network.timeout_ms))
        .build()
}

/// Send a request, retrying transport failures and 5xx answers up to
/// `retries` more times with a linear backoff.
///
/// Non-5xx responses are returned as-is; callers decide which statuses are fatal.
pub async fn send_with_retry(request: RequestBuilder, retries: u32) -> ArchiveResult<Response> {
    let mut attempt = 0;
    loop {
        let Some(current) = request.try_clone() else {
            return Ok(request.send().await?);
        };
        match current.send().await {
            Ok(resp) if resp.status().is_server_error() && attempt < retries => {
                debug!("HTTP {} from {}, retrying", resp.status(), resp.url());
            }
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < retries && (e.is_timeout() || e.is_connect() || e.is_request()) => {
                debug!("Request error ({}), retrying", e);
            }
            Err(e) => return Err(ArchiveError::Http(e)),
        }
        attempt += 1;
        tokio::time::sleep(RETRY_BACKOFF * attempt).await;
    }
}

/// Turn a non-success status into [`ArchiveError::RequestFailed`].
pub fn ensure_success(resp: Response) -> ArchiveResult<Response> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ArchiveError::RequestFailed {
            url: resp.url().to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp)
}
