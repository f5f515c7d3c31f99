//! Engine configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the engine can run with zero
//! configuration for local development.

use std::sync::Arc;
use std::time::Duration;

use crate::responder::CannedResponder;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Constant reply text returned by the canned responder.
    /// Env: `REPLY_TEXT`
    /// Default: `"This is a simulated assistant response."`
    pub reply_text: String,

    /// Simulated generation latency of the canned responder.
    /// Env: `REPLY_DELAY_MS`
    /// Default: `1000`
    pub reply_delay: Duration,

    /// Optional upper bound on reply generation; expiry reports a
    /// generation failure while the user's message stays persisted.
    /// Env: `REPLY_TIMEOUT_MS`
    /// Default: none (wait indefinitely).
    pub reply_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reply_text: "This is a simulated assistant response.".to_string(),
            reply_delay: Duration::from_millis(1000),
            reply_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(text) = std::env::var("REPLY_TEXT") {
            if !text.is_empty() {
                config.reply_text = text;
            }
        }

        if let Ok(val) = std::env::var("REPLY_DELAY_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.reply_delay = Duration::from_millis(ms);
            } else {
                tracing::warn!(value = %val, "Invalid REPLY_DELAY_MS, using default");
            }
        }

        if let Ok(val) = std::env::var("REPLY_TIMEOUT_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.reply_timeout = Some(Duration::from_millis(ms));
            } else {
                tracing::warn!(value = %val, "Invalid REPLY_TIMEOUT_MS, using default");
            }
        }

        config
    }

    /// Build the canned responder described by this configuration.
    pub fn responder(&self) -> Arc<CannedResponder> {
        Arc::new(CannedResponder::new(
            self.reply_text.clone(),
            self.reply_delay,
        ))
    }
}
