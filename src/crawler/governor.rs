//! Request governor enforcing the API's sliding-window quotas
//!
//! This module handles:
//! - Tracking the instants of recent outbound requests
//! - Computing how long to wait before the next request would respect both
//!   the short and the long quota window
//! - Blocking the caller for that long and recording the request
//!
//! The remote service counts every request it receives, so every attempt,
//! failed or not, must pass through [`RateGovernor::acquire`].

use crate::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One quota: at most `limit` requests in any trailing `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: usize,
    pub window: Duration,
    /// Added to the computed wait to absorb skew against the remote counter
    pub margin: Duration,
}

/// Sliding-window rate governor over two independent quotas
///
/// The governor keeps the instants of requests made within the long window,
/// oldest first. It is owned by a single fetcher; concurrent use would need
/// the acquire-and-record step behind a lock.
#[derive(Debug)]
pub struct RateGovernor {
    short: Window,
    long: Window,
    requests: VecDeque<Instant>,
}

impl RateGovernor {
    /// Creates a governor for the given short and long quotas
    pub fn new(short: Window, long: Window) -> Self {
        Self {
            short,
            long,
            requests: VecDeque::with_capacity(long.limit),
        }
    }

    /// Creates a governor from the `[rate-limit]` configuration section
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Window {
                limit: config.short_limit,
                window: config.short_window(),
                margin: config.short_margin(),
            },
            Window {
                limit: config.long_limit,
                window: config.long_window(),
                margin: config.long_margin(),
            },
        )
    }

    /// Blocks until a request may be issued, then records it
    ///
    /// Safe to call in a tight loop: once a window is saturated every call
    /// waits for the oldest relevant request to age out.
    pub async fn acquire(&mut self) {
        let wait = self.required_wait(Instant::now());
        if !wait.is_zero() {
            tracing::debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.record(Instant::now());
    }

    /// Computes how long a request issued at `now` would have to wait
    ///
    /// Prunes requests older than the long window as a side effect. Returns
    /// `Duration::ZERO` when a request may go out immediately.
    pub fn required_wait(&mut self, now: Instant) -> Duration {
        self.prune(now);

        let mut wait = Duration::ZERO;

        // Long window: everything retained is inside it
        if self.requests.len() >= self.long.limit {
            let boundary = self.requests[self.requests.len() - self.long.limit];
            wait = wait.max(until(boundary + self.long.window + self.long.margin, now));
        }

        // Short window: count from the newest end
        let in_short = self
            .requests
            .iter()
            .rev()
            .take_while(|&&t| now.saturating_duration_since(t) < self.short.window)
            .count();
        if in_short >= self.short.limit {
            let boundary = self.requests[self.requests.len() - self.short.limit];
            wait = wait.max(until(boundary + self.short.window + self.short.margin, now));
        }

        wait
    }

    /// Records a request issued at `at`
    ///
    /// Instants must be recorded in non-decreasing order.
    pub fn record(&mut self, at: Instant) {
        self.requests.push_back(at);
    }

    /// Number of requests currently remembered (those inside the long window
    /// as of the last check)
    pub fn tracked(&self) -> usize {
        self.requests.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.requests.front() {
            if now.saturating_duration_since(oldest) >= self.long.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }
}

fn until(deadline: Instant, now: Instant) -> Duration {
    deadline.saturating_duration_since(now)
}
