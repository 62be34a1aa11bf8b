// src/lib.rs
//! SessionScope Session Recording Library
//!
//! This library provides client-side session instrumentation: it captures a
//! user's UI activity through a pluggable recording engine, enriches it with
//! application-level telemetry (errors, internal API calls, navigation), and
//! delivers the result to a collection endpoint in ordered, resumable chunks.
//!
//! # Architecture
//!
//! The recorder is structured into several key modules:
//!
//! - **controller**: Session lifecycle (`SessionRecorder`) and the optional
//!   process-wide registry
//! - **engine**: Recording-engine capability trait and adapter
//! - **hooks**: Error, network, and navigation instrumentation hooks
//! - **host**: Replaceable host-application globals the hooks wrap
//! - **recording**: Event buffering, chunking, and the background flush loop
//! - **transport**: Collection-endpoint wire types and HTTP client
//! - **events**: Session, chunk, and custom-event types
//! - **metadata**: Client-context capture and user-agent parsing
//! - **sanitize**: Sensitive-field classification for input masking
//! - **config**: Recorder configuration and loading
//! - **utils**: Errors, id generation, and time helpers

// Public module exports
pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod hooks;
pub mod host;
pub mod logging;
pub mod metadata;
pub mod recording;
pub mod sanitize;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use config::{MaskingRules, RecorderConfig};
pub use controller::SessionRecorder;
pub use engine::{EngineHandle, EngineOptions, RecordingEngine, UiEventSink};
pub use events::{Chunk, CustomEvent, CustomEventData, Session, UiEvent, UserIdentity};
pub use host::HostGlobals;
pub use metadata::ClientContext;
pub use recording::RecorderStats;
pub use transport::{Collector, HttpCollector};
pub use utils::errors::{RecorderError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
