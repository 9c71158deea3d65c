use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::PostFetcher;
use crate::types::{Post, UserPostCount};
use log::{debug, error, info};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Where a cycle gets its two views from.
#[allow(async_fn_in_trait)]
pub trait StatsSource {
    async fn top_posts(
        &self,
        subreddit: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>, FetchError>;

    async fn top_contributors(
        &self,
        subreddit: &str,
        top_n: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserPostCount>, FetchError>;
}

impl StatsSource for PostFetcher {
    async fn top_posts(
        &self,
        subreddit: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>, FetchError> {
        self.fetch_top_posts(subreddit, limit, cancel).await
    }

    async fn top_contributors(
        &self,
        subreddit: &str,
        top_n: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserPostCount>, FetchError> {
        self.fetch_top_contributors(subreddit, top_n, cancel).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    TopPosts,
    TopContributors,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::TopPosts => f.write_str("top posts"),
            Query::TopContributors => f.write_str("top contributors"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{query} query failed: {source}")]
pub struct CycleError {
    pub query: Query,
    #[source]
    pub source: FetchError,
}

impl CycleError {
    fn on(query: Query) -> impl FnOnce(FetchError) -> CycleError {
        move |source| CycleError { query, source }
    }
}

#[derive(Debug, Clone)]
pub struct Schedule {
    pub subreddit: String,
    pub top_posts: usize,
    pub top_users: usize,
    pub interval: Duration,
}

impl Schedule {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            subreddit: cfg.subreddit.clone(),
            top_posts: cfg.top_posts,
            top_users: cfg.top_users,
            interval: cfg.poll_interval,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub posts: Vec<Post>,
    pub contributors: Vec<UserPostCount>,
}

/// Lines emitted for one successful cycle, in order.
pub fn report_lines(schedule: &Schedule, report: &CycleReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.posts.len() + report.contributors.len() + 2);
    lines.push(format!("Top {} Posts by Score", schedule.top_posts));
    for p in &report.posts {
        lines.push(format!("{} | {} | {}", p.title, p.score, p.author));
    }
    lines.push(format!("Top {} Users by Post Count", schedule.top_users));
    for u in &report.contributors {
        lines.push(format!("{} | {}", u.author, u.post_count));
    }
    lines
}

pub struct Scheduler<S> {
    source: S,
    schedule: Schedule,
}

impl<S: StatsSource> Scheduler<S> {
    pub fn new(source: S, schedule: Schedule) -> Self {
        Self { source, schedule }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch both views. The contributor query starts only after the posts
    /// query has finished, so it sees the quota that query left behind.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleReport, CycleError> {
        let s = &self.schedule;
        let posts = self
            .source
            .top_posts(&s.subreddit, s.top_posts, cancel)
            .await
            .map_err(CycleError::on(Query::TopPosts))?;
        let contributors = self
            .source
            .top_contributors(&s.subreddit, s.top_users, cancel)
            .await
            .map_err(CycleError::on(Query::TopContributors))?;
        Ok(CycleReport {
            posts,
            contributors,
        })
    }

    /// Run one cycle and log its outcome. A cancelled cycle is not logged as
    /// a failure but is still returned as an error.
    pub async fn run_logged_cycle(
        &self,
        cycle: u64,
        cancel: &CancellationToken,
    ) -> Result<(), CycleError> {
        match self.run_cycle(cancel).await {
            Ok(report) => {
                for line in report_lines(&self.schedule, &report) {
                    info!("{}", line);
                }
                Ok(())
            }
            Err(e) if e.source.is_cancelled() => {
                debug!("cycle {} interrupted by shutdown", cycle);
                Err(e)
            }
            Err(e) => {
                error!(
                    "cycle {} for r/{}: {}",
                    cycle, self.schedule.subreddit, e
                );
                Err(e)
            }
        }
    }

    /// Poll until `cancel` fires. Returns the number of cycles started.
    pub async fn run(&self, cancel: &CancellationToken) -> u64 {
        info!(
            "polling r/{} every {:?}",
            self.schedule.subreddit, self.schedule.interval
        );
        let mut cycle: u64 = 0;
        while !cancel.is_cancelled() {
            cycle += 1;
            // failures are logged inside; the loop carries on regardless
            let _ = self.run_logged_cycle(cycle, cancel).await;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.schedule.interval) => {}
            }
        }
        info!("scheduler stopped after {} cycles", cycle);
        cycle
    }
}
