//! Conversation transcript with a bounded window.
//!
//! The transcript always starts with the system prompt at index 0. When a
//! window cap is configured, the oldest non-system messages are evicted
//! first; the system prompt itself is never evicted.

use serde::{Deserialize, Serialize};

// ─────────────────────────────── Messages ───────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Developer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Developer => "developer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn developer(content: impl Into<String>) -> Self {
        Self { role: Role::Developer, content: content.into() }
    }
}

// ─────────────────────────────── History ───────────────────────────────

/// Append-only transcript with oldest-first eviction past the window cap.
#[derive(Debug, Clone)]
pub struct History {
    messages: Vec<Message>,
    max_messages: usize,
}

impl History {
    /// `max_messages` of 0 means unbounded.
    pub fn new(system_prompt: impl Into<String>, max_messages: usize) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            max_messages,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    pub fn push_developer(&mut self, content: impl Into<String>) {
        self.push(Message::developer(content));
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        if self.max_messages > 0 {
            // Index 0 holds the system prompt and stays put.
            while self.messages.len() > self.max_messages && self.messages.len() > 1 {
                self.messages.remove(1);
            }
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ─────────────────────────────── Tests ───────────────────────────────
