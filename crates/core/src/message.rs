//! Chat history value objects.
//!
//! A session's history is a strictly alternating, append-only sequence of
//! user and assistant turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The LLM
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,

    pub content: String,

    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = ChatTurn::user("民法の相続について教えてください");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "民法の相続について教えてください");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::assistant("ok")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        assert_eq!(Role::User.to_string(), "user");
    }
}
