// Public modules
pub mod chat_chunk;
pub mod chat_message;
pub mod chat_request;
pub mod content_part;

// Re-exports
pub use chat_chunk::{ChatChunk, ChunkChoice, ChunkDelta, StreamError};
pub use chat_message::{ChatContent, ChatMessage, ChatRole};
pub use chat_request::ChatRequest;
pub use content_part::{ContentPart, ImageUrl};
