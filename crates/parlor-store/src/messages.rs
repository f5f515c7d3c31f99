//! CRUD and query operations for [`Message`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Message, MessageOrigin};

/// Hard cap on search results, newest first.
const SEARCH_LIMIT: u32 = 100;

impl Database {
    /// Append a message to a room.
    ///
    /// The text must be non-empty after trimming; the trimmed text is what
    /// gets persisted.  The message insert and the owning room's
    /// `last_activity_at` update are committed in a single transaction, so
    /// either both land durably or neither does.
    pub fn append_message(
        &mut self,
        room_id: Uuid,
        text: &str,
        origin: MessageOrigin,
    ) -> Result<Message> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyText);
        }

        let message = Message::new(room_id, origin, trimmed);

        let tx = self.conn_mut().transaction()?;

        tx.query_row(
            "SELECT 1 FROM rooms WHERE id = ?1",
            params![room_id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Sqlite(other),
        })?;

        tx.execute(
            "INSERT INTO messages (id, room_id, origin, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                message.id.to_string(),
                message.room_id.to_string(),
                message.origin.as_str(),
                message.text,
                message.created_at.to_rfc3339(),
            ],
        )?;

        tx.execute(
            "UPDATE rooms SET last_activity_at = ?2 WHERE id = ?1",
            params![room_id.to_string(), message.created_at.to_rfc3339()],
        )?;

        tx.commit()?;

        tracing::debug!(
            room = %room_id,
            message = %message.id,
            origin = message.origin.as_str(),
            "message appended"
        );

        Ok(message)
    }

    /// List a room's full thread in chronological (append) order.
    ///
    /// Fails with [`StoreError::NotFound`] when the room does not exist,
    /// including after a cascade delete.
    pub fn list_messages(&self, room_id: Uuid) -> Result<Vec<Message>> {
        self.ensure_room_exists(room_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT id, room_id, origin, text, created_at
             FROM messages
             WHERE room_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(params![room_id.to_string()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// List a newest-first page of a room's thread, for incremental loading.
    pub fn list_recent_messages(
        &self,
        room_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>> {
        self.ensure_room_exists(room_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT id, room_id, origin, text, created_at
             FROM messages
             WHERE room_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt.query_map(params![room_id.to_string(), limit, offset], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Fetch a single message by UUID.
    pub fn get_message(&self, id: Uuid) -> Result<Message> {
        self.conn()
            .query_row(
                "SELECT id, room_id, origin, text, created_at
                 FROM messages WHERE id = ?1",
                params![id.to_string()],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Search message text across one room (or all rooms) by
    /// case-insensitive substring match, newest first.
    pub fn search_messages(&self, query: &str, room_id: Option<Uuid>) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, room_id, origin, text, created_at
             FROM messages
             WHERE instr(lower(text), lower(?1)) > 0
               AND (?2 IS NULL OR room_id = ?2)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(
            params![query, room_id.map(|id| id.to_string()), SEARCH_LIMIT],
            row_to_message,
        )?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    fn ensure_room_exists(&self, room_id: Uuid) -> Result<()> {
        self.conn()
            .query_row(
                "SELECT 1 FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;
        Ok(())
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let room_id_str: String = row.get(1)?;
    let origin_str: String = row.get(2)?;
    let text: String = row.get(3)?;
    let ts_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let room_id = Uuid::parse_str(&room_id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let origin = MessageOrigin::from_column(&origin_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown message origin '{origin_str}'").into(),
        )
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id,
        room_id,
        origin,
        text,
        created_at,
    })
}
