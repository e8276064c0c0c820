//! Conversation state: completed turns and the wire-level message log.
//!
//! [`ConversationLog`] owns the ordered wire messages for the active session
//! and builds the message list for each request. History is append-only; the
//! single exception is image pruning, which strips image parts from every
//! user message older than the newest so that only one request image is ever
//! in flight (remote endpoints cap the number of accepted images, and the
//! base64 payloads dominate request size).

use serde::{Deserialize, Serialize};

use crate::types::{ChatContent, ChatMessage, ContentPart};

/// One completed exchange: user input plus the assistant's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Unix milliseconds at commit time.
    pub timestamp: i64,

    /// The user-origin text of the turn.
    pub transcription: String,

    /// The assistant's reply.
    pub ai_response: String,
}

/// The ordered wire-level message log of the active session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new user entry built from optional text and an optional
    /// base64 image, pruning image parts from all earlier user entries first.
    ///
    /// If both arguments are `None` the log is left untouched.
    pub fn append_user(&mut self, text: Option<&str>, image_base64: Option<&str>) {
        let mut parts = Vec::new();
        if let Some(text) = text {
            parts.push(ContentPart::text(text));
        }
        if let Some(image) = image_base64 {
            parts.push(ContentPart::image_base64(image));
        }
        if parts.is_empty() {
            return;
        }

        self.prune_images();
        self.messages.push(ChatMessage::user_parts(parts));
    }

    /// Appends the assistant's reply.
    pub fn append_assistant(&mut self, text: &str) {
        self.messages.push(ChatMessage::assistant(text));
    }

    /// Builds the message list for a request.
    ///
    /// With `use_history` the full pruned history follows the system prompt
    /// in original order; without it, only the most recent entry does. The
    /// current input was just appended, so it is always that entry.
    pub fn build_message_list(
        &self,
        system_prompt: Option<&str>,
        use_history: bool,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::new();

        if let Some(system) = system_prompt
            && !system.is_empty()
        {
            messages.push(ChatMessage::system(system));
        }

        if use_history {
            messages.extend(self.messages.iter().cloned());
        } else if let Some(last) = self.messages.last() {
            messages.push(last.clone());
        }

        messages
    }

    /// Number of stored wire messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no messages are stored.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The stored wire messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Discards all stored messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn prune_images(&mut self) {
        for message in &mut self.messages {
            if let ChatContent::Parts(parts) = &mut message.content {
                parts.retain(|part| !part.is_image());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    #[test]
    fn only_newest_user_entry_keeps_its_image() {
        let mut log = ConversationLog::new();
        for i in 0..3 {
            log.append_user(Some(&format!("question {i}")), Some("aW1hZ2U="));
            log.append_assistant(&format!("answer {i}"));
        }

        let with_images: Vec<usize> = log
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.has_image())
            .map(|(i, _)| i)
            .collect();
        // Entries are U0 A0 U1 A1 U2 A2; only U2 may carry an image.
        assert_eq!(with_images, vec![4]);
    }

    #[test]
    fn pruning_is_stable_across_repeated_builds() {
        let mut log = ConversationLog::new();
        log.append_user(Some("first"), Some("aW1hZ2U="));
        log.append_assistant("reply");
        log.append_user(Some("second"), Some("aW1hZ2U="));

        let first_build = log.build_message_list(Some("system"), true);
        let second_build = log.build_message_list(Some("system"), true);
        assert_eq!(first_build, second_build);

        let image_count = second_build.iter().filter(|m| m.has_image()).count();
        assert_eq!(image_count, 1);
        assert!(second_build.last().is_some_and(ChatMessage::has_image));
    }

    #[test]
    fn without_history_the_list_is_at_most_two() {
        let mut log = ConversationLog::new();
        for i in 0..5 {
            log.append_user(Some(&format!("q{i}")), None);
            log.append_assistant(&format!("a{i}"));
        }
        log.append_user(Some("current"), None);

        let messages = log.build_message_list(Some("system"), false);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);

        let messages = log.build_message_list(None, false);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let mut log = ConversationLog::new();
        log.append_user(Some("hello"), None);

        assert_eq!(log.build_message_list(Some(""), true).len(), 1);
        assert_eq!(log.build_message_list(None, true).len(), 1);
    }

    #[test]
    fn append_user_with_nothing_is_a_no_op() {
        let mut log = ConversationLog::new();
        log.append_user(None, None);
        assert!(log.is_empty());
    }

    #[test]
    fn history_order_is_preserved() {
        let mut log = ConversationLog::new();
        log.append_user(Some("one"), None);
        log.append_assistant("two");
        log.append_user(Some("three"), None);

        let messages = log.build_message_list(Some("sys"), true);
        let roles: Vec<ChatRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
    }
}
