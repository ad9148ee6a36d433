//! Best-effort public IP lookup, attached to order headers.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Returns the caller's public IP as reported by `url` (`{"ip": "..."}`), or
/// `None` on any failure or when `timeout` elapses.
pub async fn lookup_client_ip(url: &str, timeout: Duration) -> Option<String> {
    match tokio::time::timeout(timeout, fetch_ip(url, timeout)).await {
        Ok(Ok(ip)) => Some(ip),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "client IP lookup failed");
            None
        }
        Err(_) => {
            tracing::debug!(timeout_ms = timeout.as_millis(), "client IP lookup timed out");
            None
        }
    }
}

async fn fetch_ip(url: &str, timeout: Duration) -> Result<String, StoreError> {
    let client = Client::builder().timeout(timeout).build()?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let parsed: IpResponse = serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
        context: "client ip".to_string(),
        source: e,
    })?;
    Ok(parsed.ip)
}
