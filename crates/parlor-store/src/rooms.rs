//! CRUD operations for [`Room`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Room;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new room.
    ///
    /// The room name must be non-empty and unique ignoring case; violations
    /// surface as [`StoreError::EmptyName`] / [`StoreError::DuplicateName`].
    pub fn create_room(&self, room: &Room) -> Result<()> {
        if room.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }

        self.conn()
            .execute(
                "INSERT INTO rooms (id, name, thumbnail, created_at, last_activity_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    room.id.to_string(),
                    room.name,
                    room.thumbnail,
                    room.created_at.to_rfc3339(),
                    room.last_activity_at.to_rfc3339(),
                ],
            )
            .map_err(|e| map_name_conflict(&room.name, e))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single room by UUID.
    pub fn get_room(&self, id: Uuid) -> Result<Room> {
        self.conn()
            .query_row(
                "SELECT id, name, thumbnail, created_at, last_activity_at
                 FROM rooms
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_room,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all rooms, most recently active first.
    pub fn list_rooms(&self) -> Result<Vec<Room>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, thumbnail, created_at, last_activity_at
             FROM rooms
             ORDER BY last_activity_at DESC",
        )?;

        let rows = stmt.query_map([], row_to_room)?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(row?);
        }
        Ok(rooms)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Rename a room.
    ///
    /// The new name must be non-empty and must not collide (ignoring case)
    /// with any *other* room; renaming a room to its own current name is a
    /// valid no-op.
    pub fn rename_room(&self, id: Uuid, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }

        let affected = self
            .conn()
            .execute(
                "UPDATE rooms SET name = ?2 WHERE id = ?1",
                params![id.to_string(), new_name],
            )
            .map_err(|e| map_name_conflict(new_name, e))?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(room = %id, name = %new_name, "room renamed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a room and, via the foreign-key cascade, all of its messages.
    pub fn delete_room(&self, id: Uuid) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM rooms WHERE id = ?1", params![id.to_string()])?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(room = %id, "room deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a unique-index violation on `rooms(name)` to [`StoreError::DuplicateName`].
fn map_name_conflict(name: &str, e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateName(name.to_string())
        }
        _ => StoreError::Sqlite(e),
    }
}

/// Map a `rusqlite::Row` to a [`Room`].
fn row_to_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let thumbnail: String = row.get(2)?;
    let created_str: String = row.get(3)?;
    let activity_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let last_activity_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&activity_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Room {
        id,
        name,
        thumbnail,
        created_at,
        last_activity_at,
    })
}
