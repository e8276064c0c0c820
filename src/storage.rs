//! Persistence seam for conversation turns.
//!
//! Durable storage is the host's concern (the desktop app keeps records in
//! its own database); the core only defines the record shape and the
//! [`TurnStore`] trait it writes through after every committed turn. The
//! bundled [`MemoryTurnStore`] backs tests and hosts that do their real
//! persistence from the [`crate::SessionEvent::ConversationTurnSaved`] event.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::Turn;

/// The per-session record handed to the store after each committed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session identifier.
    pub session_id: String,

    /// Session creation time, Unix milliseconds.
    pub timestamp: i64,

    /// All committed turns, oldest first.
    pub conversation_history: Vec<Turn>,

    /// Last write time, Unix milliseconds.
    pub last_updated: i64,
}

/// A keyed store of session records.
pub trait TurnStore: Send + Sync {
    /// Insert or replace the record for its session.
    fn save_session(&self, record: &SessionRecord) -> Result<()>;

    /// Fetch one record by session id.
    fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// All records, most recently created first.
    fn list_sessions(&self) -> Result<Vec<SessionRecord>>;
}

/// An in-memory [`TurnStore`].
#[derive(Debug, Default)]
pub struct MemoryTurnStore {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl MemoryTurnStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TurnStore for MemoryTurnStore {
    fn save_session(&self, record: &SessionRecord) -> Result<()> {
        self.lock()
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.lock().get(session_id).cloned())
    }

    fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut sessions: Vec<SessionRecord> = self.lock().values().cloned().collect();
        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(sessions)
    }
}
