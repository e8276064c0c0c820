use serde::{Deserialize, Serialize};

use crate::types::ContentPart;

/// The content of a chat message, which can be either a string or an array of
/// content parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChatContent {
    /// A simple string content.
    String(String),

    /// An array of content parts.
    Parts(Vec<ContentPart>),
}

/// A single wire-level message in a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: ChatRole,

    /// The content of the message.
    pub content: ChatContent,
}

/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System role.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl ChatMessage {
    /// Create a new `ChatMessage` with the given role and content.
    pub fn new(role: ChatRole, content: ChatContent) -> Self {
        Self { role, content }
    }

    /// Create a new system `ChatMessage` with a string content.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, ChatContent::String(content.into()))
    }

    /// Create a new user `ChatMessage` with a string content.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, ChatContent::String(content.into()))
    }

    /// Create a new user `ChatMessage` from content parts.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(ChatRole::User, ChatContent::Parts(parts))
    }

    /// Create a new assistant `ChatMessage` with a string content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, ChatContent::String(content.into()))
    }

    /// Returns true if any content part of this message is an image.
    pub fn has_image(&self) -> bool {
        match &self.content {
            ChatContent::String(_) => false,
            ChatContent::Parts(parts) => parts.iter().any(ContentPart::is_image),
        }
    }
}

impl From<&str> for ChatMessage {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for ChatMessage {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_with_string_content() {
        let message = ChatMessage::user("Hello there");
        let json = to_value(&message).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": "Hello there"
            })
        );
    }

    #[test]
    fn message_with_parts() {
        let message = ChatMessage::user_parts(vec![
            ContentPart::text("Look at this:"),
            ContentPart::image_base64("QkFTRTY0"),
        ]);
        let json = to_value(&message).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "Look at this:" },
                    {
                        "type": "image_url",
                        "image_url": { "url": "data:image/jpeg;base64,QkFTRTY0" }
                    }
                ]
            })
        );
        assert!(message.has_image());
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = to_value(ChatMessage::system("be brief")).unwrap();
        assert_eq!(json["role"], json!("system"));

        let json = to_value(ChatMessage::assistant("done")).unwrap();
        assert_eq!(json["role"], json!("assistant"));
    }

    #[test]
    fn message_deserialization_roundtrip() {
        let json = json!({
            "role": "user",
            "content": [
                { "type": "text", "text": "hi" }
            ]
        });

        let message: ChatMessage = serde_json::from_value(json).unwrap();
        assert_eq!(message.role, ChatRole::User);
        match message.content {
            ChatContent::Parts(parts) => assert_eq!(parts, vec![ContentPart::text("hi")]),
            _ => panic!("Expected Parts variant"),
        }
    }
}
