//! Shared data models.

pub mod chat;
pub mod query;

// Re-export commonly used types
pub use chat::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use query::{display_value, keep_last, QueryOutcome, MAX_DISPLAY_ROWS};
