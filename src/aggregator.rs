//! Folds incoming token and status updates into the visible response list.
//!
//! The transport reports *cumulative* text, so a continuation of the current
//! turn replaces the last visible entry rather than appending to it. Whether
//! an update continues the current entry or opens a new one is decided per
//! update: an explicit awaiting-new request always opens one, short filler
//! acknowledgements open one, and everything else overwrites the last entry
//! while it is still incomplete. Streamed text cannot reliably signal its own
//! end, so entries are only marked complete by backend status signals.

/// Markers that classify a short update as filler rather than a continuation.
const FILLER_MARKERS: [&str; 5] = ["hmm", "okay", "next", "go on", "continue"];

/// Maximum length (in characters) of an update that can be filler.
const FILLER_MAX_CHARS: usize = 30;

/// Status fragments that mark the current entry complete. Substring match,
/// case-sensitive.
const TERMINAL_STATUS_MARKERS: [&str; 3] = ["Ready", "Listening", "Error"];

/// The receiving-side aggregator: an ordered list of displayed responses and
/// the state deciding where the next update lands.
#[derive(Debug, Clone, Default)]
pub struct ResponseFeed {
    responses: Vec<String>,
    current_index: Option<usize>,
    awaiting_new: bool,
    current_complete: bool,
}

impl ResponseFeed {
    /// Creates an empty feed.
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            current_index: None,
            awaiting_new: false,
            current_complete: true,
        }
    }

    /// Declares that the next update belongs to a new turn (called when the
    /// user submits input).
    pub fn expect_new_response(&mut self) {
        self.awaiting_new = true;
    }

    /// Folds one cumulative text update into the feed.
    pub fn on_token(&mut self, text: &str) {
        if self.awaiting_new || self.responses.is_empty() {
            // An explicitly requested turn always opens a new entry.
            self.push_new(text);
            self.awaiting_new = false;
        } else if !self.current_complete && !is_filler(text) {
            // Streaming continuation of the current turn: cumulative text
            // replaces the last entry.
            if let Some(last) = self.responses.last_mut() {
                *last = text.to_string();
            }
        } else {
            // Filler, or the current entry already completed.
            self.push_new(text);
        }
    }

    /// Folds one status update into the feed. A terminal status is the only
    /// way the current entry becomes complete short of a new explicit turn.
    pub fn on_status(&mut self, status: &str) {
        if TERMINAL_STATUS_MARKERS
            .iter()
            .any(|marker| status.contains(marker))
        {
            self.current_complete = true;
        }
    }

    /// The displayed responses, oldest first.
    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    /// Index of the entry updates currently land in.
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Returns true if the current entry has been marked complete.
    pub fn current_is_complete(&self) -> bool {
        self.current_complete
    }

    /// Returns true if the next update will open a new entry.
    pub fn is_awaiting_new(&self) -> bool {
        self.awaiting_new
    }

    /// Clears all entries and aggregation state.
    pub fn clear(&mut self) {
        self.responses.clear();
        self.current_index = None;
        self.awaiting_new = false;
        self.current_complete = true;
    }

    fn push_new(&mut self, text: &str) {
        self.responses.push(text.to_string());
        self.current_index = Some(self.responses.len() - 1);
        self.current_complete = false;
    }
}

/// A short, low-information acknowledgement that should not overwrite the
/// answer currently on screen.
fn is_filler(text: &str) -> bool {
    if text.chars().count() >= FILLER_MAX_CHARS {
        return false;
    }
    let lowered = text.to_lowercase();
    FILLER_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
