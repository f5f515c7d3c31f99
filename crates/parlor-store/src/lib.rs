//! # parlor-store
//!
//! Local persistent storage for Parlor chat data, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for rooms and
//! messages.  Every mutating helper is durably committed before it returns;
//! room deletion cascades to the room's messages.

pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod rooms;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
