//! Run parameters: timeouts and pacing.
//!
//! [`RunParams`] groups the static knobs of the query fan-out and the
//! consensus turn loop. These are application-layer concerns, not domain
//! policy.

use std::time::Duration;

/// Timeout and pacing parameters for a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    /// Per-request timeout. A timeout becomes a failed result (fan-out) or
    /// an aborted turn (consensus).
    pub request_timeout: Option<Duration>,
    /// Pause after each consensus turn past the first.
    pub turn_cooldown: Duration,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(120)),
            turn_cooldown: Duration::from_millis(300),
        }
    }
}

impl RunParams {
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_turn_cooldown(mut self, cooldown: Duration) -> Self {
        self.turn_cooldown = cooldown;
        self
    }

    /// Creates params from seconds/milliseconds as read from configuration.
    ///
    /// A zero timeout means no timeout.
    pub fn from_config_values(timeout_seconds: u64, cooldown_ms: u64) -> Self {
        Self {
            request_timeout: (timeout_seconds > 0).then(|| Duration::from_secs(timeout_seconds)),
            turn_cooldown: Duration::from_millis(cooldown_ms),
        }
    }
}
