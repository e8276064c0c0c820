//! Reconnection bookkeeping for unexpectedly dropped sessions.
//!
//! [`ReconnectionState`] tracks the bounded attempt counter and the stored
//! session parameters needed to recreate a session. The parameters double as
//! the cancellation signal: `close_session` clears them, and a delayed retry
//! that wakes up to find them gone aborts instead of reconnecting with stale
//! credentials. The retry loop itself lives on
//! [`crate::SessionManager::handle_connection_lost`] as an explicit bounded
//! loop.

use std::time::Duration;

use crate::config::SessionParams;

/// State of the bounded reconnection policy.
#[derive(Debug, Clone)]
pub struct ReconnectionState {
    attempts: u32,
    max_attempts: u32,
    delay: Duration,
    params: Option<SessionParams>,
}

impl ReconnectionState {
    /// Creates a disarmed state with the given bound and delay.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            delay,
            params: None,
        }
    }

    /// Stores the parameters of a freshly initialized session and resets the
    /// attempt counter.
    pub fn arm(&mut self, params: SessionParams) {
        self.params = Some(params);
        self.attempts = 0;
    }

    /// Drops the stored parameters and resets the counter. Called on close;
    /// any in-flight delayed retry will observe the missing parameters and
    /// abort.
    pub fn clear(&mut self) {
        self.params = None;
        self.attempts = 0;
    }

    /// Saturates the counter and drops the parameters; used when retrying is
    /// pointless (authentication failures).
    pub fn exhaust(&mut self) {
        self.attempts = self.max_attempts;
        self.params = None;
    }

    /// Claims the next attempt. Returns `false` once the bound is reached.
    pub fn begin_attempt(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Resets the counter after a successful reconnection.
    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
    }

    /// The stored session parameters, if armed.
    pub fn params(&self) -> Option<&SessionParams> {
        self.params.as_ref()
    }

    /// Attempts claimed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The fixed delay before each attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
