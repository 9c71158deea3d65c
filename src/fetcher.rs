use crate::aggregate;
use crate::config::Config;
use crate::error::FetchError;
use crate::http::{self, RateLimitedInvoker};
use crate::types::{Listing, Post, UserPostCount};
use log::debug;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Page size requested for the contributor view. The endpoint is queried for
/// a single page only, so this is the largest size the API accepts.
pub const CONTRIBUTORS_PAGE_SIZE: u32 = i32::MAX as u32;

/// Query string for a score-sorted submission search.
pub fn search_query(subreddit: &str, size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("subreddit", subreddit.to_string()),
        ("sort", "score".to_string()),
        ("sort_type", "desc".to_string()),
        ("size", size.to_string()),
    ]
}

/// Decode a search response. An empty body is an empty page.
pub fn parse_posts(body: &str) -> Result<Vec<Post>, FetchError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let listing: Listing<Post> = serde_json::from_str(body)?;
    Ok(listing.data)
}

pub struct PostFetcher {
    client: Client,
    api_url: Url,
    invoker: RateLimitedInvoker,
}

impl PostFetcher {
    pub fn new(client: Client, api_url: Url, invoker: RateLimitedInvoker) -> Self {
        Self {
            client,
            api_url,
            invoker,
        }
    }

    pub fn from_config(cfg: &Config) -> reqwest::Result<Self> {
        let client = http::build_client(cfg)?;
        Ok(Self::new(
            client,
            cfg.api_url.clone(),
            RateLimitedInvoker::new(cfg.retry_policy()),
        ))
    }

    pub fn invoker(&self) -> &RateLimitedInvoker {
        &self.invoker
    }

    /// Fetch one page of submissions, highest score first.
    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        size: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>, FetchError> {
        let query = search_query(subreddit, size);
        let body = self
            .invoker
            .invoke(cancel, || http::get_text(&self.client, &self.api_url, &query))
            .await?;
        let posts = parse_posts(&body)?;
        debug!("r/{}: fetched {} posts (size={})", subreddit, posts.len(), size);
        Ok(posts)
    }

    pub async fn fetch_top_posts(
        &self,
        subreddit: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>, FetchError> {
        let size = u32::try_from(limit).unwrap_or(CONTRIBUTORS_PAGE_SIZE);
        let posts = self.fetch_posts(subreddit, size, cancel).await?;
        Ok(aggregate::top_by_score(posts, limit))
    }

    pub async fn fetch_top_contributors(
        &self,
        subreddit: &str,
        top_n: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserPostCount>, FetchError> {
        let posts = self
            .fetch_posts(subreddit, CONTRIBUTORS_PAGE_SIZE, cancel)
            .await?;
        Ok(aggregate::top_contributors(&posts, top_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters() {
        let q = search_query("python", 10);
        assert_eq!(
            q,
            vec![
                ("subreddit", "python".to_string()),
                ("sort", "score".to_string()),
                ("sort_type", "desc".to_string()),
                ("size", "10".to_string()),
            ]
        );
        assert_eq!(search_query("x", CONTRIBUTORS_PAGE_SIZE)[3].1, "2147483647");
    }

    #[test]
    fn parse_empty_and_malformed() {
        assert!(parse_posts("").unwrap().is_empty());
        assert!(parse_posts("  \n").unwrap().is_empty());
        assert!(parse_posts(r#"{"data":[]}"#).unwrap().is_empty());
        assert!(matches!(parse_posts("<html>"), Err(FetchError::Decode(_))));
        assert!(matches!(
            parse_posts(r#"{"data":[{"score":"high"}]}"#),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn parse_full_record() {
        let body = r#"{"data":[{
            "title":"Hello","author":"guido","url":"https://example.com",
            "score":120,"ups":130,"downs":10,"permalink":"/r/python/1",
            "selftext":"body","created_utc":1609459200,"num_comments":4
        }]}"#;
        let posts = parse_posts(body).unwrap();
        assert_eq!(posts.len(), 1);
        let p = &posts[0];
        assert_eq!(p.title, "Hello");
        assert_eq!(p.ups, 130);
        assert_eq!(p.downs, 10);
        assert_eq!(p.num_comments, 4);
        assert_eq!(p.permalink, "/r/python/1");
        assert_eq!(p.created_utc.to_rfc3339(), "2021-01-01T00:00:00+00:00");
    }
}
