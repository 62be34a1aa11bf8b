// src/events/custom.rs
//! Typed application-level telemetry events
//!
//! A `CustomEvent` is append-only: the controller assigns its id and capture
//! timestamp and nothing edits it afterwards. The payload is a tagged sum
//! type so each variant carries only its own fields.

use crate::utils::{ids, time};
use serde::{Deserialize, Serialize};

/// Application-defined telemetry event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEvent {
    /// Generated event id
    pub id: String,

    /// Capture timestamp (ms since epoch)
    pub timestamp_ms: u64,

    /// Variant payload, tagged by `type`
    #[serde(flatten)]
    pub data: CustomEventData,
}

/// Custom event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CustomEventData {
    /// Route change within the host application
    PageNavigation {
        /// Previous path; None for the first page of a session
        from_path: Option<String>,
        to_path: String,
    },

    /// Synchronous error or unhandled rejection observed in the host
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
        error_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    /// Outbound network call observed by the network hook
    ApiCall {
        url: String,
        method: String,
        /// HTTP status, or 0 on network failure
        status: u16,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Explicit user action reported by the host application
    UserAction {
        action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        element: Option<String>,
    },

    /// Performance metric reported by the host application
    Performance { metric: String, value: f64 },
}

impl CustomEvent {
    /// Wrap a payload with a generated id and the current timestamp
    pub fn now(data: CustomEventData) -> Self {
        Self {
            id: ids::event_id(),
            timestamp_ms: time::now_ms(),
            data,
        }
    }

    /// Significant events can trigger an out-of-band flush when enough of
    /// them accumulate
    pub fn is_significant(&self) -> bool {
        matches!(
            self.data,
            CustomEventData::Error { .. }
                | CustomEventData::ApiCall { .. }
                | CustomEventData::PageNavigation { .. }
        )
    }
}
