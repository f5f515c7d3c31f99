//! Room create/rename/delete policy.
//!
//! The directory owns the naming rules: names are trimmed, must be
//! non-empty, and must be unique across all rooms ignoring case.  An
//! operation that would violate a rule is rejected before any mutation
//! reaches the store.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use parlor_store::{Database, Message, Room};

use crate::error::EngineError;

/// Policy layer over the room collection.
pub struct RoomDirectory {
    db: Arc<Mutex<Database>>,
}

impl RoomDirectory {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Create a room from a candidate name.
    ///
    /// The name is trimmed; an empty result or a case-insensitive collision
    /// with an existing room rejects the operation.
    pub fn create(&self, candidate_name: &str) -> Result<Room, EngineError> {
        let name = candidate_name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyName);
        }

        let db = self.lock()?;
        if Self::name_taken(&db, name, None)? {
            return Err(EngineError::DuplicateName(name.to_string()));
        }

        let room = Room::new(name);
        db.create_room(&room)?;

        tracing::info!(room = %room.id, name = %room.name, "room created");
        Ok(room)
    }

    /// Rename a room.
    ///
    /// Same trim/empty/duplicate checks as [`create`](Self::create), except
    /// the target room is excluded from the duplicate comparison so its own
    /// unchanged name never self-conflicts.
    pub fn rename(&self, room_id: Uuid, candidate_name: &str) -> Result<(), EngineError> {
        let name = candidate_name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyName);
        }

        let db = self.lock()?;
        if Self::name_taken(&db, name, Some(room_id))? {
            return Err(EngineError::DuplicateName(name.to_string()));
        }

        db.rename_room(room_id, name)?;

        tracing::info!(room = %room_id, name = %name, "room renamed");
        Ok(())
    }

    /// Delete a room and, by cascade, its entire thread.
    pub fn delete(&self, room_id: Uuid) -> Result<(), EngineError> {
        let db = self.lock()?;
        db.delete_room(room_id)?;

        tracing::info!(room = %room_id, "room deleted");
        Ok(())
    }

    /// List all rooms, most recently active first.
    pub fn rooms(&self) -> Result<Vec<Room>, EngineError> {
        let db = self.lock()?;
        Ok(db.list_rooms()?)
    }

    /// A room's full thread in chronological order.
    pub fn messages(&self, room_id: Uuid) -> Result<Vec<Message>, EngineError> {
        let db = self.lock()?;
        Ok(db.list_messages(room_id)?)
    }

    /// Search message text across one room or all rooms, newest first.
    pub fn search(&self, query: &str, room_id: Option<Uuid>) -> Result<Vec<Message>, EngineError> {
        let db = self.lock()?;
        Ok(db.search_messages(query, room_id)?)
    }

    /// Whether `name` collides (ignoring case) with any room other than
    /// `exclude`.
    fn name_taken(db: &Database, name: &str, exclude: Option<Uuid>) -> Result<bool, EngineError> {
        let needle = name.to_lowercase();
        let taken = db
            .list_rooms()?
            .iter()
            .filter(|room| Some(room.id) != exclude)
            .any(|room| room.name.to_lowercase() == needle);
        Ok(taken)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Database>, EngineError> {
        self.db.lock().map_err(|_| EngineError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(dir: &tempfile::TempDir) -> RoomDirectory {
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        RoomDirectory::new(Arc::new(Mutex::new(db)))
    }

    #[test]
    fn create_trims_and_lists_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = directory(&dir);

        let created = rooms.create("  Team  ").unwrap();
        assert_eq!(created.name, "Team");

        let listed = rooms.rooms().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Team");
    }

    #[test]
    fn create_rejects_empty_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = directory(&dir);

        assert!(matches!(rooms.create(" \t "), Err(EngineError::EmptyName)));

        rooms.create("Team").unwrap();
        let err = rooms.create("team").unwrap_err();
        assert!(matches!(err, EngineError::DuplicateName(_)));
    }

    #[test]
    fn rename_excludes_self_but_not_others() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = directory(&dir);

        let team = rooms.create("Team").unwrap();
        let lounge = rooms.create("Lounge").unwrap();

        // Re-casing a room's own name is allowed ("Team" -> "team ").
        rooms.rename(team.id, "team ").unwrap();
        let listed = rooms.rooms().unwrap();
        let renamed = listed.iter().find(|r| r.id == team.id).unwrap();
        assert_eq!(renamed.name, "team");

        // A different room cannot take that name in any casing.
        let err = rooms.rename(lounge.id, "TEAM").unwrap_err();
        assert!(matches!(err, EngineError::DuplicateName(_)));
    }

    #[test]
    fn rename_missing_room() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = directory(&dir);

        let err = rooms.rename(Uuid::new_v4(), "Ghost").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Store(parlor_store::StoreError::NotFound)
        ));
    }

    #[test]
    fn delete_cascades_to_thread() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = directory(&dir);

        let team = rooms.create("Team").unwrap();
        {
            let mut db = rooms.db.lock().unwrap();
            db.append_message(team.id, "hello", parlor_store::MessageOrigin::User)
                .unwrap();
        }

        rooms.delete(team.id).unwrap();

        assert!(matches!(
            rooms.messages(team.id).unwrap_err(),
            EngineError::Store(parlor_store::StoreError::NotFound)
        ));
        assert!(matches!(
            rooms.delete(team.id).unwrap_err(),
            EngineError::Store(parlor_store::StoreError::NotFound)
        ));
    }

    #[test]
    fn search_passthrough_scopes_by_room() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = directory(&dir);

        let team = rooms.create("Team").unwrap();
        let lounge = rooms.create("Lounge").unwrap();
        {
            let mut db = rooms.db.lock().unwrap();
            db.append_message(team.id, "standup notes", parlor_store::MessageOrigin::User)
                .unwrap();
            db.append_message(lounge.id, "standup moved", parlor_store::MessageOrigin::User)
                .unwrap();
        }

        assert_eq!(rooms.search("STANDUP", None).unwrap().len(), 2);
        let scoped = rooms.search("standup", Some(lounge.id)).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].room_id, lounge.id);
    }
}
