use super::quota::{QuotaState, QuotaTracker};
use crate::error::{CallError, FetchError};
use chrono::{TimeDelta, Utc};
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Quota values read off a successful response. `reset_secs` is relative to
/// the moment the response was observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaHeaders {
    pub remaining: Option<u32>,
    pub reset_secs: Option<u64>,
}

/// Successful outcome of one dispatch of a wrapped call.
#[derive(Debug, Clone)]
pub struct Dispatched<T> {
    pub value: T,
    pub quota: QuotaHeaders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Gates remote calls on the server-advertised quota and retries calls the
/// server refused with a rate-limit status.
///
/// Two independent layers apply to every invocation:
/// 1. a pre-flight wait while the last known quota is exhausted and its reset
///    lies in the future;
/// 2. a fixed-backoff retry when the dispatched call itself is rate limited.
///
/// `gate` admits one gating decision (and its wait) at a time and is released
/// before the call is dispatched. `quota` is held only to read or write the
/// numbers, so recording a response never queues behind a gated wait.
#[derive(Debug, Default)]
pub struct RateLimitedInvoker {
    gate: Mutex<()>,
    quota: Mutex<QuotaTracker>,
    policy: RetryPolicy,
}

impl RateLimitedInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            gate: Mutex::new(()),
            quota: Mutex::new(QuotaTracker::new()),
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn quota(&self) -> QuotaState {
        self.quota.lock().await.snapshot()
    }

    /// Fold response headers into the tracked quota.
    pub async fn observe(&self, headers: QuotaHeaders) {
        let now = Utc::now();
        let reset_at = headers
            .reset_secs
            .and_then(|s| i64::try_from(s).ok())
            .and_then(TimeDelta::try_seconds)
            .and_then(|d| now.checked_add_signed(d));
        let mut tracker = self.quota.lock().await;
        tracker.update(headers.remaining, reset_at);
        debug!(
            "quota updated: remaining={} reset_at={}",
            tracker.current_remaining(),
            tracker.current_reset_at().to_rfc3339()
        );
    }

    /// Run `call` under the quota gate, retrying rate-limited dispatches.
    ///
    /// `call` is invoked once per attempt, so at most `max_retries + 1`
    /// times. Transport failures are returned after the first attempt.
    pub async fn invoke<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut call: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Dispatched<T>, CallError>>,
    {
        let mut retries: u32 = 0;
        loop {
            self.acquire(cancel).await?;
            match call().await {
                Ok(dispatched) => {
                    self.observe(dispatched.quota).await;
                    return Ok(dispatched.value);
                }
                Err(CallError::RateLimited(message)) => {
                    if retries >= self.policy.max_retries {
                        return Err(FetchError::RateLimitExceeded {
                            attempts: retries + 1,
                            message,
                        });
                    }
                    retries += 1;
                    warn!(
                        "rate limited ({}), retry {}/{} in {:?}",
                        message, retries, self.policy.max_retries, self.policy.backoff
                    );
                    sleep_or_cancel(self.policy.backoff, cancel).await?;
                }
                Err(CallError::Transport(message)) => return Err(FetchError::Transport(message)),
            }
        }
    }

    async fn acquire(&self, cancel: &CancellationToken) -> Result<(), FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let _gate = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            guard = self.gate.lock() => guard,
        };
        let delay = self.quota.lock().await.wait_before_dispatch(Utc::now());
        if let Some(delay) = delay {
            info!(
                "rate limit reached, waiting {:.1}s before dispatch",
                delay.as_secs_f64()
            );
            sleep_or_cancel(delay, cancel).await?;
        }
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        Ok(())
    }
}

async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), FetchError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
