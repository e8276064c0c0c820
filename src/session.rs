//! Session lifecycle and command handling.
//!
//! [`SessionManager`] owns the single active session and drives every host
//! command against it: initialization (re-entrancy-guarded), the send
//! commands with their input validation and status choreography, snapshots,
//! and the bounded reconnection loop for transports that hold a persistent
//! connection. All state mutation happens behind `&mut self` on one logical
//! control path, so the core needs no locking.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::client::Transport;
use crate::clock::{Clock, SystemClock};
use crate::config::{SessionConfig, SessionParams};
use crate::error::{Error, Result};
use crate::event::{EventSink, NullSink, SessionEvent};
use crate::history::{ConversationLog, Turn};
use crate::observability;
use crate::reconnect::ReconnectionState;
use crate::storage::{MemoryTurnStore, SessionRecord, TurnStore};

/// Status strings the session layer emits. Centralized so hosts and the
/// aggregator's substring matching share one vocabulary.
pub mod status {
    /// Session established.
    pub const CONNECTED: &str = "Connected";
    /// A text request is in flight.
    pub const THINKING: &str = "Thinking...";
    /// An image request is in flight.
    pub const ANALYZING_IMAGE: &str = "Analyzing Image...";
    /// A multimodal request is in flight.
    pub const ANALYZING: &str = "Analyzing...";
    /// The last request completed; input is accepted again.
    pub const READY: &str = "Ready";
    /// Terminal: the session is gone and will not reconnect.
    pub const SESSION_CLOSED: &str = "Session closed";

    /// Status line for one reconnection attempt.
    pub fn reconnecting(attempt: u32, max_attempts: u32) -> String {
        format!("Reconnecting... ({attempt}/{max_attempts})")
    }

    /// Status line for a surfaced failure.
    pub fn error(err: &impl std::fmt::Display) -> String {
        format!("Error: {err}")
    }
}

/// Minimum length of a plausible base64 image payload.
const MIN_IMAGE_PAYLOAD_LEN: usize = 100;

struct Session {
    id: String,
    system_prompt: String,
    params: SessionParams,
    log: ConversationLog,
    turns: Vec<Turn>,
}

/// A point-in-time view of the active session for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The active session id, if any.
    pub session_id: Option<String>,

    /// Committed turns of the active session, oldest first.
    pub history: Vec<Turn>,
}

/// Owns the active session and executes host commands against it.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn EventSink>,
    store: Arc<dyn TurnStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    session: Option<Session>,
    initializing: bool,
    reconnect: ReconnectionState,
}

impl SessionManager {
    /// Creates a manager with default collaborators: no event sink, an
    /// in-memory store, and the system clock.
    pub fn new(transport: Arc<dyn Transport>, config: SessionConfig) -> Self {
        Self::with_collaborators(
            transport,
            Arc::new(NullSink),
            Arc::new(MemoryTurnStore::new()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// Creates a manager with explicit collaborators.
    pub fn with_collaborators(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn EventSink>,
        store: Arc<dyn TurnStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let reconnect =
            ReconnectionState::new(config.max_reconnect_attempts, config.reconnect_delay);
        Self {
            transport,
            sink,
            store,
            clock,
            config,
            session: None,
            initializing: false,
            reconnect,
        }
    }

    /// Initializes a new session, discarding any previous one.
    ///
    /// Serialized by a busy flag: a second call while one is in flight is
    /// rejected immediately rather than queued. On success the reconnection
    /// counter resets and the parameters are stored for later reconnects; on
    /// failure no partial session state is left behind.
    pub async fn initialize_session(&mut self, params: SessionParams) -> Result<String> {
        if self.initializing {
            return Err(Error::busy("session initialization already in progress"));
        }
        self.initializing = true;
        self.sink.emit(SessionEvent::SessionInitializing(true));

        let result = self.do_initialize(params).await;

        self.initializing = false;
        self.sink.emit(SessionEvent::SessionInitializing(false));
        match result {
            Ok(id) => {
                observability::SESSIONS_INITIALIZED.click();
                self.emit_status(status::CONNECTED);
                Ok(id)
            }
            Err(err) => {
                self.emit_status(status::error(&err));
                Err(err)
            }
        }
    }

    async fn do_initialize(&mut self, params: SessionParams) -> Result<String> {
        if params.api_key.trim().is_empty() {
            return Err(Error::authentication("API key must not be empty"));
        }
        self.transport.open_session(&params.api_key).await?;

        let system_prompt = self
            .config
            .template
            .build(&params.custom_prompt, self.config.search_enabled);
        let id = self.clock.now_millis().to_string();
        self.reconnect.arm(params.clone());
        self.session = Some(Session {
            id: id.clone(),
            system_prompt,
            params,
            log: ConversationLog::new(),
            turns: Vec::new(),
        });
        tracing::info!(session_id = %id, "new conversation session started");
        Ok(id)
    }

    /// Sends a text message and streams the response.
    pub async fn send_text(&mut self, text: &str) -> Result<String> {
        self.active_session()?;
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            return Err(Error::validation("Invalid text", None));
        }

        self.emit_status(status::THINKING);
        self.dispatch(
            Some(trimmed.clone()),
            None,
            trimmed,
            self.config.use_history,
        )
        .await
    }

    /// Sends a screen capture and streams the response.
    ///
    /// Images always go out with history so the model keeps the conversation
    /// thread; the empty response token resets whatever the host currently
    /// displays.
    pub async fn send_image(&mut self, image_base64: &str) -> Result<String> {
        self.active_session()?;
        validate_image(image_base64)?;

        self.sink.emit(SessionEvent::ResponseToken(String::new()));
        self.emit_status(status::ANALYZING_IMAGE);
        self.dispatch(
            None,
            Some(image_base64.to_string()),
            "[Image Upload]".to_string(),
            true,
        )
        .await
    }

    /// Sends text plus a screen capture and streams the response.
    pub async fn send_multimodal(&mut self, text: &str, image_base64: &str) -> Result<String> {
        self.active_session()?;
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() || image_base64.is_empty() {
            return Err(Error::validation("Missing text or image", None));
        }
        validate_image(image_base64)?;

        self.emit_status(status::ANALYZING);
        let transcription = format!("{trimmed} [with Image]");
        self.dispatch(
            Some(trimmed),
            Some(image_base64.to_string()),
            transcription,
            self.config.use_history,
        )
        .await
    }

    /// Closes the session: the stored reconnection parameters are cleared
    /// (so no in-flight or future reconnect can use stale credentials) and
    /// the active session is discarded. Idempotent.
    pub fn close_session(&mut self) {
        self.reconnect.clear();
        if self.session.take().is_some() {
            tracing::info!("session closed");
        }
    }

    /// Returns a snapshot of the active session for the host UI.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        match &self.session {
            Some(session) => SessionSnapshot {
                session_id: Some(session.id.clone()),
                history: session.turns.clone(),
            },
            None => SessionSnapshot {
                session_id: None,
                history: Vec::new(),
            },
        }
    }

    /// Starts a fresh conversation on the active session: new id, empty
    /// history, same credentials and system prompt.
    pub fn start_new_session(&mut self) -> Result<String> {
        let id = self.clock.now_millis().to_string();
        let session = self.active_session_mut()?;
        session.id = id.clone();
        session.turns.clear();
        session.log.clear();
        tracing::info!(session_id = %id, "new conversation session started");
        Ok(id)
    }

    /// Drives the bounded reconnection loop after an unexpected disconnect.
    ///
    /// Only meaningful for transports holding a persistent connection; the
    /// host's connection watcher calls this when the link drops. Each
    /// attempt waits the fixed delay, re-checks that the session has not
    /// been closed in the meantime, and re-establishes the transport state;
    /// on success the conversation context is replayed as one synthetic
    /// message. An authentication failure aborts immediately. When the
    /// bound is exhausted the terminal status is emitted and no further
    /// attempts happen.
    pub async fn handle_connection_lost(&mut self) {
        tracing::warn!("session transport disconnected unexpectedly");
        loop {
            if self.reconnect.params().is_none() {
                self.emit_status(status::SESSION_CLOSED);
                return;
            }
            if !self.reconnect.begin_attempt() {
                observability::RECONNECTS_EXHAUSTED.click();
                self.reconnect.clear();
                self.emit_status(status::SESSION_CLOSED);
                return;
            }

            let attempt = self.reconnect.attempts();
            let max_attempts = self.reconnect.max_attempts();
            observability::RECONNECT_ATTEMPTS.click();
            self.emit_status(status::reconnecting(attempt, max_attempts));
            self.clock.sleep(self.reconnect.delay()).await;

            // The session may have been closed while we waited.
            let Some(params) = self.reconnect.params().cloned() else {
                self.emit_status(status::SESSION_CLOSED);
                return;
            };

            match self.try_restore(&params).await {
                Ok(()) => {
                    self.reconnect.reset_attempts();
                    self.emit_status(status::CONNECTED);
                    return;
                }
                Err(err) if err.is_authentication() => {
                    tracing::warn!(error = %err, "authentication failed; abandoning reconnection");
                    self.reconnect.exhaust();
                    self.emit_status(status::error(&err));
                    self.emit_status(status::SESSION_CLOSED);
                    return;
                }
                Err(err) => {
                    tracing::warn!(error = %err, attempt, "reconnection attempt failed");
                }
            }
        }
    }

    async fn try_restore(&mut self, params: &SessionParams) -> Result<()> {
        self.transport.open_session(&params.api_key).await?;

        let replay = {
            let session = self.active_session()?;
            replay_context(&session.turns)
                .map(|context| (session.system_prompt.clone(), context))
        };
        if let Some((system_prompt, context)) = replay {
            let messages = vec![
                crate::types::ChatMessage::system(system_prompt),
                crate::types::ChatMessage::user(context),
            ];
            let discard = |_: &str| {};
            self.transport
                .send_chat(&params.api_key, &messages, &discard)
                .await?;
        }
        Ok(())
    }

    async fn dispatch(
        &mut self,
        text: Option<String>,
        image_base64: Option<String>,
        transcription: String,
        use_history: bool,
    ) -> Result<String> {
        let (api_key, messages) = {
            let session = self.active_session_mut()?;
            session
                .log
                .append_user(text.as_deref(), image_base64.as_deref());
            let messages = session
                .log
                .build_message_list(Some(&session.system_prompt), use_history);
            (session.params.api_key.clone(), messages)
        };

        let sink = Arc::clone(&self.sink);
        let on_token =
            move |cumulative: &str| sink.emit(SessionEvent::ResponseToken(cumulative.to_string()));

        match self
            .transport
            .send_chat(&api_key, &messages, &on_token)
            .await
        {
            Ok(response) => {
                if !response.is_empty() {
                    self.active_session_mut()?.log.append_assistant(&response);
                    self.commit_turn(transcription, &response);
                }
                self.emit_status(status::READY);
                Ok(response)
            }
            Err(err) => {
                self.emit_status(status::error(&err));
                Err(err)
            }
        }
    }

    fn commit_turn(&mut self, transcription: String, ai_response: &str) {
        let now = self.clock.now_millis();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.id.is_empty() {
            session.id = now.to_string();
        }

        let turn = Turn {
            timestamp: now,
            transcription: transcription.trim().to_string(),
            ai_response: ai_response.trim().to_string(),
        };
        session.turns.push(turn.clone());

        let record = SessionRecord {
            session_id: session.id.clone(),
            timestamp: session.id.parse().unwrap_or(now),
            conversation_history: session.turns.clone(),
            last_updated: now,
        };
        if let Err(err) = self.store.save_session(&record) {
            tracing::warn!(error = %err, "failed to persist conversation turn");
        }
        observability::TURNS_SAVED.click();

        self.sink.emit(SessionEvent::ConversationTurnSaved {
            session_id: session.id.clone(),
            turn,
            full_history: session.turns.clone(),
        });
    }

    fn active_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(Error::no_session)
    }

    fn active_session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or_else(Error::no_session)
    }

    fn emit_status(&self, text: impl Into<String>) {
        self.sink.emit(SessionEvent::StatusChanged(text.into()));
    }
}

/// Rejects payloads that cannot be a screen capture: too short to be a real
/// JPEG, or not valid base64 at all.
fn validate_image(image_base64: &str) -> Result<()> {
    if image_base64.len() < MIN_IMAGE_PAYLOAD_LEN {
        return Err(Error::validation(
            "Invalid image data",
            Some("image".to_string()),
        ));
    }
    STANDARD
        .decode(image_base64)
        .map_err(|_| Error::validation("Invalid image data", Some("image".to_string())))?;
    Ok(())
}

/// The synthetic message replayed after a reconnect: the concatenation of
/// all prior user-turn texts, so the new connection has continuity.
fn replay_context(turns: &[Turn]) -> Option<String> {
    if turns.is_empty() {
        return None;
    }
    let joined = turns
        .iter()
        .map(|turn| turn.transcription.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!(
        "Context from our interrupted conversation:\n{joined}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TokenCallback;
    use crate::types::ChatMessage;

    struct NoopTransport;

    #[async_trait::async_trait]
    impl Transport for NoopTransport {
        async fn send_chat(
            &self,
            _api_key: &str,
            _messages: &[ChatMessage],
            _on_token: TokenCallback<'_>,
        ) -> Result<String> {
            Ok(String::new())
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(NoopTransport), SessionConfig::new())
    }

    #[tokio::test]
    async fn second_initialize_while_busy_is_rejected() {
        let mut manager = manager();
        manager.initializing = true;

        let err = manager
            .initialize_session(SessionParams::new("sk-test"))
            .await
            .unwrap_err();
        assert!(err.is_busy());
    }

    #[tokio::test]
    async fn empty_api_key_fails_initialization_cleanly() {
        let mut manager = manager();
        let err = manager
            .initialize_session(SessionParams::new("   "))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert!(!manager.initializing);
        assert_eq!(manager.session_snapshot().session_id, None);
    }

    #[test]
    fn image_validation() {
        assert!(validate_image("").is_err());
        assert!(validate_image("dG9vIHNob3J0").is_err());

        let valid = "QUFB".repeat(40);
        assert!(validate_image(&valid).is_ok());

        let invalid = "!".repeat(200);
        assert!(validate_image(&invalid).is_err());
    }

    #[test]
    fn replay_context_concatenates_user_turns() {
        assert_eq!(replay_context(&[]), None);

        let turns = vec![
            Turn {
                timestamp: 1,
                transcription: "first question".to_string(),
                ai_response: "a1".to_string(),
            },
            Turn {
                timestamp: 2,
                transcription: "second question".to_string(),
                ai_response: "a2".to_string(),
            },
        ];
        let context = replay_context(&turns).unwrap();
        assert!(context.contains("first question\nsecond question"));
        assert!(!context.contains("a1"));
    }

    #[test]
    fn reconnecting_status_format() {
        assert_eq!(status::reconnecting(2, 3), "Reconnecting... (2/3)");
    }
}
