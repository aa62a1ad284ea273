//! # Bank
//!
//! Payloads shared between the notes server and its clients.
//!
//! ## Note
//! - `id`: assigned by the store on creation, never changes
//! - `title`, `content`: non-empty text
//! - `createdAt`: assigned by the server on creation, RFC 3339 on the wire
//!
//! ## Bodies
//! - Requests: [`NoteInput`] for both create and update
//! - Confirmations: [`Message`]
//! - Failures: [`ErrorBody`]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NOTES_PATH: &str = "/notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Presence check only, whitespace counts as content.
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
