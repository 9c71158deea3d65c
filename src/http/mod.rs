pub mod invoker;
pub mod quota;

pub use invoker::{Dispatched, QuotaHeaders, RateLimitedInvoker, RetryPolicy};
pub use quota::{QuotaState, QuotaTracker};

use crate::config::Config;
use crate::error::CallError;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(default_headers)
        .user_agent(cfg.user_agent.as_str())
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()
}

/// Split a non-success status into "back off and retry" vs. everything else.
pub fn classify_status(status: StatusCode, body: String) -> CallError {
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body.trim())
    };
    match status {
        StatusCode::TOO_MANY_REQUESTS => CallError::RateLimited(message),
        _ => CallError::Transport(message),
    }
}

// Some deployments send these as decimals ("299.0").
fn header_count(headers: &HeaderMap, name: &str) -> Option<u64> {
    let raw = headers.get(name).and_then(|v| v.to_str().ok())?.trim();
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.trunc() as u64)
    })
}

pub fn extract_quota(headers: &HeaderMap) -> QuotaHeaders {
    QuotaHeaders {
        remaining: header_count(headers, REMAINING_HEADER).map(|n| n.min(u32::MAX as u64) as u32),
        reset_secs: header_count(headers, RESET_HEADER),
    }
}

/// One GET dispatch: send, then read the body on success. Non-success statuses
/// and send failures come back as `CallError`; quota headers ride along with
/// the body.
pub async fn get_text(
    client: &Client,
    url: &Url,
    query: &[(&str, String)],
) -> Result<Dispatched<String>, CallError> {
    let res = client
        .get(url.clone())
        .query(query)
        .send()
        .await
        .map_err(|e| CallError::Transport(format!("GET {} failed: {}", url, e)))?;

    let status = res.status();
    let quota = extract_quota(res.headers());
    debug!("GET {} -> {}", url, status);
    if status.is_success() {
        let value = res
            .text()
            .await
            .map_err(|e| CallError::Transport(format!("reading body from {}: {}", url, e)))?;
        return Ok(Dispatched { value, quota });
    }
    let text = res.text().await.unwrap_or_default();
    Err(classify_status(status, text))
}
