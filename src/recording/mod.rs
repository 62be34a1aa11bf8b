// src/recording/mod.rs
//! Event buffering and flushing
//!
//! - **buffer**: Atomic-swap buffer and chunker for the active session
//! - **flusher**: Background flush loop feeding the transport
//!
//! # Architecture
//!
//! ```text
//! Engine sink ──push_ui──────►┐
//! Hooks / track ─push_custom──► EventBuffer ──take_chunk──► Flusher ──► Collector
//!                              ▲                               │
//!                              └────── requeue on failure ─────┘
//! ```

pub mod buffer;
pub mod flusher;

pub use buffer::{EventBuffer, SIGNIFICANT_EVENT_FLUSH_THRESHOLD};
pub use flusher::{Flusher, RecorderStats};
