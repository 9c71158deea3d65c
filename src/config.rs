use crate::http::RetryPolicy;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.pushshift.io/reddit/submission/search";

/// Static runtime configuration. Built once at startup, never re-read.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub subreddit: String,
    pub top_posts: usize,
    pub top_users: usize,
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - SUBREDDIT_STATS_API_URL (default: pushshift submission search)
    /// - SUBREDDIT_STATS_SUBREDDIT (default: python)
    /// - SUBREDDIT_STATS_TOP_POSTS / SUBREDDIT_STATS_TOP_USERS (default: 10)
    /// - SUBREDDIT_STATS_POLL_INTERVAL_SECS (default: 3600)
    /// - SUBREDDIT_STATS_MAX_RETRIES (default: 3)
    /// - SUBREDDIT_STATS_RETRY_BACKOFF_SECS (default: 5)
    /// - SUBREDDIT_STATS_HTTP_TIMEOUT_SECS (default: 30)
    /// - SUBREDDIT_STATS_USER_AGENT (default: subreddit-stats/<version>)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str, default: u64| {
            get(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let raw_url = get("SUBREDDIT_STATS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| format!("Invalid SUBREDDIT_STATS_API_URL {:?}: {}", raw_url, e))?;

        let subreddit = get("SUBREDDIT_STATS_SUBREDDIT").unwrap_or_else(|| "python".into());
        if subreddit.trim().is_empty() {
            return Err("SUBREDDIT_STATS_SUBREDDIT must not be empty".into());
        }

        let poll_secs = number("SUBREDDIT_STATS_POLL_INTERVAL_SECS", 3600);
        if poll_secs == 0 {
            return Err("SUBREDDIT_STATS_POLL_INTERVAL_SECS must be at least 1".into());
        }

        let user_agent = get("SUBREDDIT_STATS_USER_AGENT")
            .unwrap_or_else(|| format!("subreddit-stats/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self {
            api_url,
            subreddit,
            top_posts: number("SUBREDDIT_STATS_TOP_POSTS", 10) as usize,
            top_users: number("SUBREDDIT_STATS_TOP_USERS", 10) as usize,
            poll_interval: Duration::from_secs(poll_secs),
            max_retries: number("SUBREDDIT_STATS_MAX_RETRIES", 3).min(u32::MAX as u64) as u32,
            retry_backoff: Duration::from_secs(number("SUBREDDIT_STATS_RETRY_BACKOFF_SECS", 5)),
            user_agent,
            timeout_secs: number("SUBREDDIT_STATS_HTTP_TIMEOUT_SECS", 30),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: self.retry_backoff,
        }
    }
}
