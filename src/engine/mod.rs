// src/engine/mod.rs
//! Recording engine adapter
//!
//! The DOM/UI recording engine is an external collaborator: it watches the
//! screen and emits opaque, timestamped UI events. The core depends only on
//! the `RecordingEngine` capability shape (start with an emit callback, get
//! back a stop handle), never on the engine's internal event schema, so
//! engines are swappable.

use crate::config::RecorderConfig;
use crate::events::UiEvent;
use crate::recording::buffer::EventBuffer;
use crate::sanitize::MaskingOptions;
use crate::utils::errors::Result;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::debug;

/// Options handed to the engine at start
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Mouse-move sampling interval (ms)
    pub mouse_sample_ms: u64,

    /// Scroll sampling interval (ms)
    pub scroll_sample_ms: u64,

    /// Masking configuration (selector rules + field classifier)
    pub masking: MaskingOptions,
}

impl EngineOptions {
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self {
            mouse_sample_ms: config.mouse_sample_ms,
            scroll_sample_ms: config.scroll_sample_ms,
            masking: MaskingOptions::from_rules(&config.masking),
        }
    }
}

/// Callback the engine emits captured UI events through
pub type UiEventSink = Arc<dyn Fn(UiEvent) + Send + Sync>;

/// External recording engine capability
pub trait RecordingEngine: Send + Sync {
    /// Begin capturing; emitted events flow into `sink` until the returned
    /// handle is stopped
    fn start(&self, options: EngineOptions, sink: UiEventSink) -> Result<EngineHandle>;
}

/// Stop handle returned by a running engine
///
/// Stops the engine when consumed, or on drop if never stopped explicitly.
pub struct EngineHandle {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl EngineHandle {
    pub fn new(stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stop: Some(Box::new(stop)),
        }
    }

    /// Stop the engine
    pub fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

/// Forwards engine events into the buffer and signals the flusher when the
/// per-chunk event budget is reached
pub struct EngineAdapter {
    engine: Arc<dyn RecordingEngine>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn RecordingEngine>) -> Self {
        Self { engine }
    }

    /// Start the engine wired to the live buffer
    pub fn start(
        &self,
        config: &RecorderConfig,
        buffer: Arc<EventBuffer>,
        flush_notify: Arc<Notify>,
    ) -> Result<EngineHandle> {
        let max_events = config.max_events_per_chunk;
        let sink: UiEventSink = Arc::new(move |event: UiEvent| {
            let buffered = buffer.push_ui(event);
            if buffered >= max_events {
                debug!(buffered, "UI-event budget reached; requesting flush");
                flush_notify.notify_one();
            }
        });

        self.engine.start(EngineOptions::from_config(config), sink)
    }
}
