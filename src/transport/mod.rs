// src/transport/mod.rs
//! Chunk delivery to the collection endpoint
//!
//! The collection endpoint is a single POST route accepting a request body
//! discriminated on `action` (`start` / `events` / `end`). `Collector` is
//! the seam the controller talks through; `HttpCollector` is the production
//! implementation. Delivery is at-least-once: a send that times out after
//! the server persisted the chunk is retried by requeueing, and the chunk id
//! carried on every events request is the server's dedup key.

pub mod http;

use crate::events::{Chunk, CustomEvent, SessionMetadata, UiEvent};
use crate::utils::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpCollector;

/// Request body for the collection endpoint
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum CollectRequest<'a> {
    /// Session has begun
    Start {
        session_id: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<&'a SessionMetadata>,
    },

    /// One chunk of captured events
    Events {
        session_id: &'a str,
        chunk_id: &'a str,
        chunk_index: u64,
        #[serde(skip_serializing_if = "<[_]>::is_empty")]
        events: &'a [UiEvent],
        #[serde(skip_serializing_if = "<[_]>::is_empty")]
        custom_events: &'a [CustomEvent],
    },

    /// Session has ended
    End {
        session_id: &'a str,
        #[serde(skip_serializing_if = "<[_]>::is_empty")]
        pages_visited: &'a [String],
    },
}

/// Response from the collection endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Delivery seam between the controller and the collection endpoint
#[async_trait]
pub trait Collector: Send + Sync {
    /// Notify the server a session has begun (best-effort)
    async fn start_session(&self, session_id: &str, metadata: &SessionMetadata) -> Result<()>;

    /// Deliver one chunk; an error means the caller requeues the events
    async fn send_chunk(&self, chunk: &Chunk) -> Result<()>;

    /// Notify the server a session has ended
    async fn end_session(&self, session_id: &str, pages_visited: &[String]) -> Result<()>;
}
