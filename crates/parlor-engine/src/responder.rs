//! The pluggable reply-generation capability.
//!
//! [`ResponseGenerator`] is the single seam between the chat engine and
//! whatever produces assistant replies.  The shipped [`CannedResponder`]
//! simulates a backend with a fixed delay and a constant reply; a real
//! model-serving integration implements the same trait and drops in without
//! touching [`SessionService`](crate::SessionService).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Reply generation failed.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The backing generator reported an error.
    #[error("Response generation failed: {0}")]
    Failed(String),

    /// The configured reply timeout expired before a reply arrived.
    #[error("Response generation timed out after {0:?}")]
    TimedOut(Duration),
}

/// Produces an assistant reply for a user's input text.
///
/// Implementations must not touch the store; persistence of the reply is the
/// caller's job.  Once issued, a call runs to completion or failure; there
/// is no cancellation.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, input: &str) -> Result<String, GenerationError>;
}

/// Stand-in generator: waits a fixed simulated latency, then returns a
/// constant string.
pub struct CannedResponder {
    reply: String,
    delay: Duration,
}

impl CannedResponder {
    pub fn new(reply: impl Into<String>, delay: Duration) -> Self {
        Self {
            reply: reply.into(),
            delay,
        }
    }
}

#[async_trait]
impl ResponseGenerator for CannedResponder {
    async fn generate(&self, _input: &str) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}
