//! Per-client fixed-window rate limiting.
//!
//! Each client key owns a window that opens on its first request. Up to
//! `max` requests are admitted inside the window; later ones are refused
//! with the time left until the window closes. Once it closes the next
//! request opens a fresh window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::AppError;

/// Windows kept before stale ones are swept.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    /// Counts one request for `key` at `now`.
    pub async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut windows = self.windows.lock().await;

        if windows.len() >= PRUNE_THRESHOLD {
            let span = self.window;
            windows.retain(|_, w| now.saturating_duration_since(w.started) < span);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        // Saturate so a client hammering a long window cannot wrap the counter.
        entry.count = entry.count.saturating_add(1);
        if entry.count > self.max {
            let retry_after = self.window - now.saturating_duration_since(entry.started);
            tracing::debug!(client = key, ?retry_after, "rate limit exceeded");
            Decision::Limited { retry_after }
        } else {
            Decision::Allowed {
                remaining: self.max - entry.count,
            }
        }
    }

    /// Like [`check`](Self::check) but maps a refusal onto a 429.
    pub async fn enforce(&self, key: &str) -> Result<(), AppError> {
        match self.check(key).await {
            Decision::Allowed { .. } => Ok(()),
            Decision::Limited { retry_after } => Err(AppError::RateLimited {
                retry_after_secs: retry_after_secs(retry_after),
            }),
        }
    }
}

/// Whole seconds for a `Retry-After` header, rounded up, never zero.
pub fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
