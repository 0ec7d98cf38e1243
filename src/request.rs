//! Correlation-id allocation. One generator instance per client, so tests
//! can assert deterministic sequences.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates ids of the form `<operation-prefix><counter>`. Uniqueness
/// within a process lifetime is all callers rely on; global ordering is not
/// promised.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, prefix: &str) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}{count}")
    }

    /// Message ids carry a timestamp so they stay unique across restarts.
    pub fn message_id(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", Utc::now().timestamp(), count)
    }
}
