// src/models.rs

use chrono::Local;
use serde::{Deserialize, Serialize};

/// The participant a message belongs to. The counterpart's wire name is
/// fixed by the backend's history format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(rename = "girlfriend")]
    Counterpart,
}

/// What the `content` field carries: plain text, or the filename of an
/// uploaded image resolved against the server's `/uploads/` path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

/// One chat message, in the same shape the history endpoint returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: String,
}

impl Message {
    /// Outgoing text message, stamped with the local clock.
    pub fn outgoing_text(content: impl Into<String>) -> Self {
        Message {
            sender: Sender::User,
            kind: MessageKind::Text,
            content: content.into(),
            timestamp: Local::now().to_rfc3339(),
        }
    }

    /// Outgoing image message carrying the server-assigned filename.
    pub fn outgoing_image(filename: impl Into<String>) -> Self {
        Message {
            sender: Sender::User,
            kind: MessageKind::Image,
            content: filename.into(),
            timestamp: Local::now().to_rfc3339(),
        }
    }

    /// Counterpart text message with the timestamp the server attached.
    pub fn counterpart_text(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Message {
            sender: Sender::Counterpart,
            kind: MessageKind::Text,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }
}
