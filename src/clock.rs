//! Time source for session ids, turn timestamps, and retry delays.
//!
//! The core never reads the wall clock or sleeps directly; it goes through
//! [`Clock`] so tests can mint deterministic session ids and drive the
//! reconnect delay without waiting.

use std::time::Duration;

use time::OffsetDateTime;

/// An injectable time source.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Current Unix time in milliseconds.
    fn now_millis(&self) -> i64;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// The production clock: wall time and `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
