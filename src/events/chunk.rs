// src/events/chunk.rs
//! Opaque UI events and flush chunks

use crate::events::custom::CustomEvent;
use serde::{Deserialize, Serialize};

/// Timestamped record emitted by the external recording engine
///
/// The payload is an uninterpreted blob; only the timestamp is used for
/// chunk bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiEvent {
    /// Capture timestamp (ms since epoch)
    pub timestamp_ms: u64,

    /// Engine-defined payload
    pub payload: serde_json::Value,
}

impl UiEvent {
    pub fn new(timestamp_ms: u64, payload: serde_json::Value) -> Self {
        Self {
            timestamp_ms,
            payload,
        }
    }
}

/// A bounded, ordered batch of events flushed together
///
/// Immutable once created. Chunk indices for a session are strictly
/// increasing and gap-free in creation order; a requeued chunk's events go
/// back into the live buffer and are re-chunked under a fresh index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Generated chunk id (the server's natural idempotency key)
    pub chunk_id: String,

    /// Owning session id
    pub session_id: String,

    /// Monotonic creation index within the session
    pub index: u64,

    /// UI events captured since the previous flush
    pub events: Vec<UiEvent>,

    /// Custom events captured since the previous flush
    pub custom_events: Vec<CustomEvent>,

    /// Start of the capture interval (ms since epoch)
    pub window_start_ms: u64,

    /// End of the capture interval (ms since epoch)
    pub window_end_ms: u64,

    /// Whether the transport compressed this chunk's payload
    pub compressed: bool,
}

impl Chunk {
    /// Total number of events carried by this chunk
    pub fn event_count(&self) -> usize {
        self.events.len() + self.custom_events.len()
    }

    /// A chunk with nothing to deliver is skipped by the flusher
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.custom_events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_count() {
        let chunk = Chunk {
            chunk_id: "chk_1".to_string(),
            session_id: "ses_1".to_string(),
            index: 0,
            events: vec![UiEvent::new(1, serde_json::json!({"kind": "click"}))],
            custom_events: Vec::new(),
            window_start_ms: 0,
            window_end_ms: 1,
            compressed: false,
        };
        assert_eq!(chunk.event_count(), 1);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_ui_event_payload_is_opaque() {
        let event = UiEvent::new(7, serde_json::json!({"nested": {"anything": [1, 2, 3]}}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestampMs"], 7);
        assert_eq!(json["payload"]["nested"]["anything"][2], 3);
    }
}
