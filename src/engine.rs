//! Retrieval-augmented answering.

use crate::error::Result;
use crate::index::Retriever;
use crate::llm::{ChatSession, Generator, NO_CONTEXT, Prompts};
use std::sync::Arc;
use tracing::debug;

/// Retrieves passages for a question and asks the generator to answer from them.
///
/// The engine holds no conversational state; history lives in the
/// [`ChatSession`] supplied by the caller. Failures are returned as-is with
/// no retries.
#[derive(Clone)]
pub struct RagEngine {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
}

impl RagEngine {
    pub fn new(retriever: Retriever, generator: Arc<dyn Generator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Build the context block for `question` from the top-k passages.
    pub async fn retrieve_context(&self, question: &str, top_k: usize) -> Result<String> {
        let texts = self.retriever.search_texts(question, top_k).await?;
        debug!(passages = texts.len(), "retrieved context");

        if texts.is_empty() {
            Ok(NO_CONTEXT.to_string())
        } else {
            Ok(texts.join("\n"))
        }
    }

    /// Answer `question` grounded in the top-k retrieved passages.
    pub async fn generate_answer(
        &self,
        session: &mut ChatSession,
        question: &str,
        top_k: usize,
    ) -> Result<String> {
        let context = self.retrieve_context(question, top_k).await?;
        let prompt = Prompts::rag_answer(question, &context);
        self.generator.generate(session, &prompt).await
    }
}
