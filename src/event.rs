//! Events the session core pushes toward the UI/host boundary.
//!
//! Hosts implement [`EventSink`] to receive them, or take the channel-backed
//! [`ChannelSink`] and drain a receiver on their own event loop.

use tokio::sync::mpsc;

use crate::history::Turn;

/// An event produced by the session core.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Session initialization started (`true`) or finished (`false`).
    SessionInitializing(bool),

    /// The human-readable status line changed.
    StatusChanged(String),

    /// Cumulative streamed response text; each event replaces the previous
    /// one, it does not append.
    ResponseToken(String),

    /// A conversation turn was committed.
    ConversationTurnSaved {
        /// The owning session.
        session_id: String,
        /// The turn that was just committed.
        turn: Turn,
        /// All turns of the session, oldest first.
        full_history: Vec<Turn>,
    },
}

/// A receiver of session events.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Implementations must not block.
    fn emit(&self, event: SessionEvent);
}

/// An [`EventSink`] that forwards events into an unbounded channel.
///
/// Dropped receivers are tolerated: events are discarded once nobody
/// listens.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver to drain it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

/// An [`EventSink`] that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SessionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(SessionEvent::SessionInitializing(true));
        sink.emit(SessionEvent::StatusChanged("Connected".to_string()));

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::SessionInitializing(true)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::StatusChanged("Connected".to_string())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(SessionEvent::SessionInitializing(true));
    }
}
