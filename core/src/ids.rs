//! Client-side identity for created records.
//!
//! The remote API answers every creation with the same placeholder id, so
//! the resource clients replace it with one issued here. Ids look like
//! wall-clock milliseconds but are strictly increasing: two creations in
//! the same millisecond, or a clock that steps backwards, still get
//! distinct ids. Ids the clients have seen from the server are fed back via
//! `observe` so an issued id never lands on an existing record.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Every id up to `u64::MAX` has been issued or observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no unused id left to assign")]
pub struct IdsExhausted;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id: the current time in milliseconds, or one past the highest id
    /// issued or observed so far, whichever is larger. Fails once `u64::MAX`
    /// is taken.
    pub fn next_id(&self) -> Result<u64, IdsExhausted> {
        let now = now_millis();
        let step = |last: u64| last.checked_add(1).map(|next| now.max(next));
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, step)
            .map_err(|_| IdsExhausted)?;
        step(prev).ok_or(IdsExhausted)
    }

    /// Record an id that exists elsewhere so it is never issued.
    pub fn observe(&self, id: u64) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }

    pub fn observe_all(&self, ids: impl IntoIterator<Item = u64>) {
        if let Some(max) = ids.into_iter().max() {
            self.observe(max);
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
