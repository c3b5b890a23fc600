//! Transcript cleanup via chat-completion models

mod chat_completion;
pub mod response_shapes;

pub use chat_completion::ChatCompletionReasoner;
