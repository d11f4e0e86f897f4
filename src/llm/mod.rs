//! LLM integration module.
//!
//! Provides an OpenAI-compatible chat client, the grounded-answer prompts,
//! and the explicit [`ChatSession`] that carries conversational history.

mod client;
mod prompts;
mod session;

pub use client::{LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use prompts::{NO_CONTEXT, Prompts};
pub use session::ChatSession;

use crate::error::Result;
use async_trait::async_trait;

/// A chat model that answers a prompt within a conversation.
///
/// Implementations read the session's history, and append the exchange to it
/// only when generation succeeds.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, session: &mut ChatSession, prompt: &str) -> Result<String>;
}
