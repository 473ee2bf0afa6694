//! Port for structured round logging.
//!
//! Defines the [`RoundLogger`] trait for recording council round events
//! (provider responses, round results) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable audit record of every round (JSONL).

use serde_json::Value;

/// A structured round event for logging.
pub struct RoundEvent {
    /// Event type identifier (e.g., "provider_response", "round_complete").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RoundEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging round events to a structured log.
///
/// `log` is synchronous and infallible; a failing sink must never affect the
/// outcome of a round.
pub trait RoundLogger: Send + Sync {
    fn log(&self, event: RoundEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRoundLogger;

impl RoundLogger for NoRoundLogger {
    fn log(&self, _event: RoundEvent) {}
}
