//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer over IPC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display-asset identifier assigned to rooms that never chose one.
pub const DEFAULT_THUMBNAIL: &str = "default";

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A named conversation thread owning an ordered list of messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    /// Unique room identifier.
    pub id: Uuid,
    /// Human-readable room name, unique ignoring case.
    pub name: String,
    /// Opaque display-asset identifier shown in the room list.
    pub thumbnail: String,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recently appended message (creation time if
    /// none).  Sort key for room listings, descending.
    pub last_activity_at: DateTime<Utc>,
}

impl Room {
    /// Build a fresh room with a generated id and the default thumbnail.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            thumbnail: DEFAULT_THUMBNAIL.to_string(),
            created_at: now,
            last_activity_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Classification of a message's author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    User,
    Assistant,
}

impl MessageOrigin {
    /// Stable string form stored in the `origin` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOrigin::User => "user",
            MessageOrigin::Assistant => "assistant",
        }
    }

    /// Inverse of [`as_str`](Self::as_str) for values read back from the
    /// column.
    pub fn from_column(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// A single immutable chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// The room this message belongs to.
    pub room_id: Uuid,
    /// Who authored the message.
    pub origin: MessageOrigin,
    /// Message text, non-empty after trimming.
    pub text: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a fresh message stamped with the current time.
    pub fn new(room_id: Uuid, origin: MessageOrigin, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            origin,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}
