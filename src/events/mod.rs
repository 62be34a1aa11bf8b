// src/events/mod.rs
//! Event and session data model
//!
//! - **chunk**: Opaque UI events and the bounded batches they flush in
//! - **custom**: Typed application-level telemetry events
//! - **session**: Session identity, status and immutable metadata
//!
//! Everything here is plain data: created by the capture surfaces, owned by
//! the buffer, serialized by the transport. Nothing in this module performs
//! IO.

pub mod chunk;
pub mod custom;
pub mod session;

pub use chunk::{Chunk, UiEvent};
pub use custom::{CustomEvent, CustomEventData};
pub use session::{Session, SessionMetadata, SessionStatus, UserIdentity};
