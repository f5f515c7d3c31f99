use thiserror::Error;

use parlor_store::StoreError;

/// Errors produced by the engine layer.
///
/// Validation failures are fully recoverable: the caller shows them and lets
/// the user retry.  Store failures pass through verbatim; prior durable state
/// is intact.  Nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Room name was empty after trimming whitespace.
    #[error("Room name cannot be empty")]
    EmptyName,

    /// Another room already carries this name (case-insensitive).
    #[error("A room named '{0}' already exists")]
    DuplicateName(String),

    /// The shared database lock was poisoned by a panicking holder.
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Persistence failure, surfaced verbatim from the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}
