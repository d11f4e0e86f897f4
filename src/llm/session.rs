//! Bounded conversational state for a chat model.

use super::client::Message;

/// One logical conversation: a fixed system message plus a sliding window
/// of the most recent user/assistant messages.
///
/// The window is trimmed before each new user turn, so a request carries the
/// system message, at most `max_history` earlier messages, and the new prompt.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system: Message,
    history: Vec<Message>,
    max_history: usize,
}

impl ChatSession {
    /// Create a session with the given system prompt and window size.
    pub fn new(system_prompt: impl Into<String>, max_history: usize) -> Self {
        Self {
            system: Message::system(system_prompt),
            history: Vec::new(),
            max_history,
        }
    }

    /// Messages to send for a new user prompt, without recording it.
    pub fn request_messages(&mut self, prompt: &str) -> Vec<Message> {
        self.trim();
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(self.system.clone());
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(prompt));
        messages
    }

    /// Record a completed exchange.
    pub fn record(&mut self, prompt: impl Into<String>, answer: impl Into<String>) {
        self.history.push(Message::user(prompt));
        self.history.push(Message::assistant(answer));
    }

    /// Drop all history, keeping the system message.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Messages recorded since the last reset (system message excluded).
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system.content
    }

    fn trim(&mut self) {
        if self.history.len() > self.max_history {
            let excess = self.history.len() - self.max_history;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::Role;

    #[test]
    fn test_fresh_session_sends_system_and_prompt() {
        let mut session = ChatSession::new("be brief", 5);
        let messages = session.request_messages("hi");
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0].role, Role::System));
        assert_eq!(messages[1].content, "hi");
        assert!(session.is_empty());
    }

    #[test]
    fn test_window_keeps_latest_messages() {
        let mut session = ChatSession::new("sys", 3);
        for i in 0..4 {
            session.record(format!("q{i}"), format!("a{i}"));
        }

        let messages = session.request_messages("next");
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "a2", "q3", "a3", "next"]);
    }

    #[test]
    fn test_reset_keeps_system_prompt() {
        let mut session = ChatSession::new("sys", 5);
        session.record("q", "a");
        session.reset();
        assert!(session.history().is_empty());
        assert_eq!(session.system_prompt(), "sys");
    }
}
