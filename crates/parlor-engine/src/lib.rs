//! # parlor-engine
//!
//! Service layer for the Parlor chat application.
//!
//! [`RoomDirectory`] owns the room naming policy (create/rename/delete,
//! case-insensitive uniqueness); [`SessionService`] runs the send flow
//! (persist the user message, ask the [`ResponseGenerator`] for a reply,
//! persist the reply).  Both take an explicit shared
//! [`Database`](parlor_store::Database) handle; there is no ambient global
//! store.
//!
//! The shipped [`CannedResponder`] simulates a reply backend with a fixed
//! delay and constant text; swapping in a real integration is a matter of
//! implementing [`ResponseGenerator`].

pub mod config;
pub mod directory;
pub mod responder;
pub mod session;

mod error;

pub use config::EngineConfig;
pub use directory::RoomDirectory;
pub use error::EngineError;
pub use responder::{CannedResponder, GenerationError, ResponseGenerator};
pub use session::{SendOutcome, SessionService};
