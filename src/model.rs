//! Chat messages and the request sent for each of them.

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A finished message. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// A user message is complete as soon as it is created.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Accumulator for an assistant message that is still streaming.
///
/// Content only ever grows. [`AssistantReply::finish`] consumes the
/// accumulator, so a finished reply cannot be appended to.
#[derive(Debug, Default)]
pub struct AssistantReply {
    content: String,
    appends: usize,
}

impl AssistantReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append decoded text from the next chunk.
    pub fn push_str(&mut self, text: &str) {
        self.content.push_str(text);
        self.appends += 1;
    }

    /// Everything received so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of appends so far, a flushed decoder tail included.
    pub fn appends(&self) -> usize {
        self.appends
    }

    pub fn finish(self) -> Message {
        Message {
            role: Role::Assistant,
            content: self.content,
        }
    }
}

/// Form body of one chat request: `message=<text>&session_id=<id>`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: &SessionId) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.clone(),
        }
    }
}
