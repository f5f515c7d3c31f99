//! v001 -- Initial schema creation.
//!
//! Creates the two core tables: `rooms` and `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Rooms
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rooms (
    id               TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name             TEXT NOT NULL,
    thumbnail        TEXT NOT NULL,               -- display-asset identifier
    created_at       TEXT NOT NULL,               -- ISO-8601 / RFC-3339
    last_activity_at TEXT NOT NULL                -- creation time until a message lands
);

-- Room names are unique ignoring case.
CREATE UNIQUE INDEX IF NOT EXISTS idx_rooms_name_unique
    ON rooms(name COLLATE NOCASE);

CREATE INDEX IF NOT EXISTS idx_rooms_last_activity
    ON rooms(last_activity_at DESC);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id         TEXT PRIMARY KEY NOT NULL,         -- UUID v4
    room_id    TEXT NOT NULL,                     -- FK -> rooms(id)
    origin     TEXT NOT NULL,                     -- 'user' | 'assistant'
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL,                     -- ISO-8601

    FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_room_ts
    ON messages(room_id, created_at ASC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
