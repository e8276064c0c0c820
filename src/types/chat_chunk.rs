use serde::{Deserialize, Serialize};

/// One decoded `data:` payload from the streamed response body.
///
/// The endpoint reports some failures in-band: a chunk may carry an `error`
/// object next to (or instead of) its `choices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatChunk {
    /// Incremental completions, one per requested choice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChunkChoice>,

    /// In-band error report, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StreamError>,
}

/// One choice inside a streamed chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// The incremental delta for this choice.
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// The incremental text delta of a streamed choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkDelta {
    /// New text to append, if this delta carries any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// An error payload embedded in the stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamError {
    /// Numeric error code, if the endpoint supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    /// Human-readable error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChatChunk {
    /// The text delta of the first choice, if present and non-empty.
    pub fn delta_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}
