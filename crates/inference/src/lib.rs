//! Client side of the chat-completion backend.
//!
//! The service only ever needs one operation from the model: given an
//! ordered list of turns, produce the next assistant turn. `InferenceClient`
//! captures that so the conversation layer can be driven by a scripted
//! client in tests and by [`OpenAiClient`] in production.

mod config;
mod error;
mod http_utils;
mod openai;

use async_trait::async_trait;
use protocol::Turn;

pub use config::{
    InferenceConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_PATH, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS,
};
pub use error::InferenceError;
pub use http_utils::join_base_path;
pub use openai::OpenAiClient;

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends `turns` in order and returns the assistant reply. No retries.
    async fn complete(&self, turns: &[Turn]) -> Result<Turn, InferenceError>;
}
