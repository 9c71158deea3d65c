use chrono::{DateTime, Utc};
use std::time::Duration;

/// Last server-reported quota. The zero value (no calls left, reset at the
/// epoch) is already expired, so it never holds back a first call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaState {
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// In-memory quota bookkeeping. No I/O; callers serialize access.
#[derive(Debug, Default)]
pub struct QuotaTracker {
    state: QuotaState,
}

impl QuotaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_remaining(&self) -> u32 {
        self.state.remaining
    }

    pub fn current_reset_at(&self) -> DateTime<Utc> {
        self.state.reset_at
    }

    pub fn snapshot(&self) -> QuotaState {
        self.state
    }

    /// Record observed values. A `None` (missing or unparseable header)
    /// keeps the previous value for that field.
    pub fn update(&mut self, remaining: Option<u32>, reset_at: Option<DateTime<Utc>>) {
        if let Some(r) = remaining {
            self.state.remaining = r;
        }
        if let Some(at) = reset_at {
            self.state.reset_at = at;
        }
    }

    /// How long a caller must hold off at `now`, if at all.
    pub fn wait_before_dispatch(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.state.remaining > 0 || now >= self.state.reset_at {
            return None;
        }
        (self.state.reset_at - now).to_std().ok()
    }
}
