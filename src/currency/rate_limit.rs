//! Tracks how many currency changes each user has made today.

use std::{collections::HashMap, sync::Mutex};

use crate::models::UserID;

/// The number of currency changes a user may make per day.
pub const MAX_DAILY_CHANGES: u32 = 5;

/// A per-user counter of currency-change requests for the current day.
///
/// The counts live in memory only: they do not survive a restart, which is
/// acceptable as long as they are consistent within a day. An external daily
/// trigger calls [RateLimiter::reset_daily]. The mutex serializes
/// increments, so concurrent requests from the same user cannot double-count.
#[derive(Debug, Default)]
pub struct RateLimiter {
    counts: Mutex<HashMap<i64, u32>>,
}

impl RateLimiter {
    /// Create a limiter with all counts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the user has already used up today's quota.
    pub fn is_limited(&self, user_id: UserID) -> bool {
        let counts = self.counts.lock().unwrap();

        counts.get(&user_id.as_i64()).copied().unwrap_or(0) >= MAX_DAILY_CHANGES
    }

    /// Count one successful currency change against the user's quota.
    pub fn record_change(&self, user_id: UserID) {
        let mut counts = self.counts.lock().unwrap();

        *counts.entry(user_id.as_i64()).or_insert(0) += 1;
    }

    /// Forget all counts. Called by the external daily trigger.
    pub fn reset_daily(&self) {
        self.counts.lock().unwrap().clear();
    }
}
