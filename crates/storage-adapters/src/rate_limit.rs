//! # Fixed-window rate limiter
//!
//! In-process implementation of the `RateLimiter` port.
//!
//! Each key owns one window that starts at its first attempt. Attempts made
//! right before and right after a window boundary are counted separately, so
//! a burst can admit up to twice the threshold.
//!
//! Entries are never evicted; the map grows with the number of distinct
//! client keys seen since start-up.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use domains::{ClientKey, Clock, RateLimiter, SystemClock};
use tracing::debug;

/// Threshold and window length for one limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    /// 5 writes per 60 seconds.
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::seconds(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

pub struct FixedWindowLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            entries: DashMap::new(),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn admit(&self, key: &ClientKey) -> bool {
        let now = self.clock.now();
        let fresh = WindowEntry {
            count: 1,
            reset_at: now + self.policy.window,
        };

        // The entry guard holds the shard lock, making the
        // read-modify-write below atomic per key.
        match self.entries.entry(key.as_str().to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                true
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.reset_at {
                    *entry = fresh;
                    true
                } else if entry.count < self.policy.max_requests {
                    entry.count += 1;
                    true
                } else {
                    debug!(client = %key, reset_at = %entry.reset_at, "window exhausted");
                    false
                }
            }
        }
    }
}
