use serde::{Deserialize, Serialize};

use crate::types::ChatMessage;

/// Request body for the chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// Identifier of the model to route the request to.
    pub model: String,

    /// The ordered message list, oldest first.
    pub messages: Vec<ChatMessage>,

    /// Whether the response body should be streamed.
    pub stream: bool,
}

impl ChatRequest {
    /// Create a new streaming `ChatRequest`.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_serialization() {
        let request = ChatRequest::new("openrouter/auto", vec![ChatMessage::user("ping")]);
        let json = to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "model": "openrouter/auto",
                "messages": [
                    { "role": "user", "content": "ping" }
                ],
                "stream": true
            })
        );
    }
}
