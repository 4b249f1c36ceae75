//! Conversation turns and the message-log collaborator contract.
//!
//! Persistence of chats is owned by the embedding application; the core
//! only appends messages and reads a bounded window of recent turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{ReportingError, Result};

pub type ChatId = u64;
pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

/// One message of a conversation. Immutable once created; the timestamp is
/// the ordering key within a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only chat log. `list_recent` returns turns newest-first.
pub trait MessageLog: Send + Sync {
    fn append_message(&self, chat_id: ChatId, sender: Sender, text: &str) -> Result<MessageId>;

    fn list_recent(&self, chat_id: ChatId, limit: usize) -> Result<Vec<ConversationTurn>>;
}

/// In-memory log for demos and tests.
#[derive(Default)]
pub struct InMemoryMessageLog {
    chats: Mutex<HashMap<ChatId, Vec<ConversationTurn>>>,
    next_id: AtomicU64,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageLog for InMemoryMessageLog {
    fn append_message(&self, chat_id: ChatId, sender: Sender, text: &str) -> Result<MessageId> {
        let mut chats = self
            .chats
            .lock()
            .map_err(|_| ReportingError::MessageLog("poisoned log lock".to_string()))?;
        chats
            .entry(chat_id)
            .or_default()
            .push(ConversationTurn::new(sender, text));
        Ok(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn list_recent(&self, chat_id: ChatId, limit: usize) -> Result<Vec<ConversationTurn>> {
        let chats = self
            .chats
            .lock()
            .map_err(|_| ReportingError::MessageLog("poisoned log lock".to_string()))?;
        Ok(chats
            .get(&chat_id)
            .map(|turns| turns.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
