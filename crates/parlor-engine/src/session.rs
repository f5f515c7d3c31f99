//! The send flow: persist the user's message, request a reply, persist the
//! reply.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use parlor_store::{Database, Message, MessageOrigin};

use crate::error::EngineError;
use crate::responder::{GenerationError, ResponseGenerator};

/// Result of one send flow.
///
/// Persistence failures surface as `Err(EngineError)` instead; in every
/// variant and error case past step one, the user's message is already
/// durably persisted.  User input is never silently lost.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SendOutcome {
    /// Both the user message and the generated reply were persisted.
    Completed { user: Message, reply: Message },
    /// The trimmed input was empty; nothing was persisted.
    EmptyInputIgnored,
    /// The generator failed (or timed out); the user message stays, no reply
    /// was appended.
    GenerationFailed { user: Message, detail: String },
}

/// Orchestrates the send flow against a shared store handle and a pluggable
/// reply generator.
pub struct SessionService {
    db: Arc<Mutex<Database>>,
    responder: Arc<dyn ResponseGenerator>,
    reply_timeout: Option<Duration>,
}

impl SessionService {
    pub fn new(db: Arc<Mutex<Database>>, responder: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            db,
            responder,
            reply_timeout: None,
        }
    }

    /// Bound reply generation; expiry reports [`SendOutcome::GenerationFailed`].
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }

    /// Send `text` into `room_id`.
    ///
    /// The user message is durably visible in the room before generation
    /// begins; the reply, if any, is appended strictly after generation
    /// completes.  The generator receives the caller's original text, not
    /// the persisted (trimmed) copy.
    ///
    /// Racing sends into the same room are not coordinated: each append is
    /// atomic on its own, but no relative ordering between two in-flight
    /// sends is promised.
    pub async fn send_message(
        &self,
        room_id: Uuid,
        text: &str,
    ) -> Result<SendOutcome, EngineError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(SendOutcome::EmptyInputIgnored);
        }

        // Step one: the user's message, durably committed. The guard must not
        // live across the await below.
        let user = {
            let mut db = self.lock()?;
            db.append_message(room_id, trimmed, MessageOrigin::User)?
        };

        let generated = self.generate_bounded(text).await;

        let reply_text = match generated {
            Ok(reply) => reply,
            Err(err) => {
                warn!(room = %room_id, error = %err, "response generation failed");
                return Ok(SendOutcome::GenerationFailed {
                    user,
                    detail: err.to_string(),
                });
            }
        };

        let reply = {
            let mut db = self.lock()?;
            db.append_message(room_id, &reply_text, MessageOrigin::Assistant)?
        };

        info!(
            room = %room_id,
            user_message = %user.id,
            reply_message = %reply.id,
            "send flow completed"
        );

        Ok(SendOutcome::Completed { user, reply })
    }

    async fn generate_bounded(&self, input: &str) -> Result<String, GenerationError> {
        match self.reply_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.responder.generate(input)).await
            {
                Ok(result) => result,
                Err(_) => Err(GenerationError::TimedOut(limit)),
            },
            None => self.responder.generate(input).await,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Database>, EngineError> {
        self.db.lock().map_err(|_| EngineError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parlor_store::Room;

    /// Replies with a fixed string after an optional delay.
    struct FixedResponder {
        reply: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl ResponseGenerator for FixedResponder {
        async fn generate(&self, _input: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.to_string())
        }
    }

    /// Always fails.
    struct BrokenResponder;

    #[async_trait]
    impl ResponseGenerator for BrokenResponder {
        async fn generate(&self, _input: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Failed("backend unavailable".to_string()))
        }
    }

    /// Honor `RUST_LOG` when debugging a failing test.
    fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn harness(
        dir: &tempfile::TempDir,
        responder: Arc<dyn ResponseGenerator>,
    ) -> (SessionService, Arc<Mutex<Database>>, Room) {
        init_test_logging();

        let db = Arc::new(Mutex::new(
            Database::open_at(&dir.path().join("test.db")).unwrap(),
        ));

        let room = Room::new("Team");
        db.lock().unwrap().create_room(&room).unwrap();

        (SessionService::new(Arc::clone(&db), responder), db, room)
    }

    #[tokio::test]
    async fn send_persists_user_then_reply() {
        let dir = tempfile::tempdir().unwrap();
        let (service, db, room) = harness(
            &dir,
            Arc::new(FixedResponder {
                reply: "world",
                delay: Duration::ZERO,
            }),
        );

        let outcome = service.send_message(room.id, "hello").await.unwrap();
        match outcome {
            SendOutcome::Completed { user, reply } => {
                assert_eq!(user.origin, MessageOrigin::User);
                assert_eq!(user.text, "hello");
                assert_eq!(reply.origin, MessageOrigin::Assistant);
                assert_eq!(reply.text, "world");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let thread = db.lock().unwrap().list_messages(room.id).unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(
            (thread[0].origin, thread[0].text.as_str()),
            (MessageOrigin::User, "hello")
        );
        assert_eq!(
            (thread[1].origin, thread[1].text.as_str()),
            (MessageOrigin::Assistant, "world")
        );
    }

    #[tokio::test]
    async fn whitespace_input_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (service, db, room) = harness(
            &dir,
            Arc::new(FixedResponder {
                reply: "never",
                delay: Duration::ZERO,
            }),
        );

        let outcome = service.send_message(room.id, "   \n ").await.unwrap();
        assert!(matches!(outcome, SendOutcome::EmptyInputIgnored));
        assert!(db.lock().unwrap().list_messages(room.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn generator_failure_keeps_user_message() {
        let dir = tempfile::tempdir().unwrap();
        let (service, db, room) = harness(&dir, Arc::new(BrokenResponder));

        let outcome = service.send_message(room.id, "ping").await.unwrap();
        match outcome {
            SendOutcome::GenerationFailed { user, detail } => {
                assert_eq!(user.text, "ping");
                assert!(detail.contains("backend unavailable"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let thread = db.lock().unwrap().list_messages(room.id).unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(
            (thread[0].origin, thread[0].text.as_str()),
            (MessageOrigin::User, "ping")
        );
    }

    #[tokio::test]
    async fn reply_timeout_reports_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (service, db, room) = harness(
            &dir,
            Arc::new(FixedResponder {
                reply: "too late",
                delay: Duration::from_secs(30),
            }),
        );
        let service = service.with_reply_timeout(Duration::from_millis(10));

        let outcome = service.send_message(room.id, "anyone?").await.unwrap();
        match outcome {
            SendOutcome::GenerationFailed { user, detail } => {
                assert_eq!(user.text, "anyone?");
                assert!(detail.contains("timed out"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        // Only the user message landed.
        assert_eq!(db.lock().unwrap().list_messages(room.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn send_to_missing_room_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _db, _room) = harness(
            &dir,
            Arc::new(FixedResponder {
                reply: "nope",
                delay: Duration::ZERO,
            }),
        );

        let err = service
            .send_message(Uuid::new_v4(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Store(parlor_store::StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn canned_responder_wired_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::EngineConfig {
            reply_delay: Duration::ZERO,
            ..Default::default()
        };
        let (service, db, room) = harness(&dir, config.responder());

        let outcome = service.send_message(room.id, "hi there").await.unwrap();
        match outcome {
            SendOutcome::Completed { reply, .. } => {
                assert_eq!(reply.text, config.reply_text);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(db.lock().unwrap().list_messages(room.id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn input_is_trimmed_before_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let (service, db, room) = harness(
            &dir,
            Arc::new(FixedResponder {
                reply: "ok",
                delay: Duration::ZERO,
            }),
        );

        service.send_message(room.id, "  hello  ").await.unwrap();

        let thread = db.lock().unwrap().list_messages(room.id).unwrap();
        assert_eq!(thread[0].text, "hello");
    }
}
