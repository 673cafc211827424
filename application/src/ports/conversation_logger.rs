//! Port for structured conversation logging.
//!
//! Records what was actually sent to and received from each model (fan-out
//! responses, consensus turns, conversion calls, extraction outcomes) in a
//! machine-readable form. `tracing` stays the channel for operational
//! diagnostics; this port is the transcript.

use serde_json::Value;

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (e.g. `"model_response"`, `"consensus_turn"`).
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` is synchronous and infallible; adapters swallow their own write
/// failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
