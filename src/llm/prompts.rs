//! Prompts for grounded question answering.

/// Context used when retrieval yields no passage with text.
pub const NO_CONTEXT: &str = "No relevant context found.";

/// Collection of prompts used by the RAG engine.
pub struct Prompts;

impl Prompts {
    /// System prompt for the answering model.
    pub fn rag_system() -> &'static str {
        r#"You are a helpful assistant that answers questions based on the provided context.
Your task is to read the context and answer the question as accurately as possible.
If the context contains the answer, provide it directly.
If the context does not contain enough information to answer the question, say "I don't have enough information to answer this question".
You should only use the information in the context to answer the question.
Your answer should be in the same language as the question."#
    }

    /// User prompt carrying the question and the retrieved context.
    pub fn rag_answer(question: &str, context: &str) -> String {
        format!("Question: {}\n\nContext: {}", question, context)
    }

    /// Prompt used to check that the chat endpoint responds.
    pub fn connection_check() -> &'static str {
        "Say 'hello' and nothing else."
    }
}
