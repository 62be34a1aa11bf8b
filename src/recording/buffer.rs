// src/recording/buffer.rs
//! Event buffer and chunker
//!
//! Accumulates UI events and custom events since the last flush. The only
//! mutation paths are `push_ui`, `push_custom`, `take_chunk` and `requeue`,
//! all serialized by one mutex, so the swap performed by `take_chunk` is
//! atomic with respect to concurrent appends: no event is lost or duplicated
//! across the swap boundary, and the swap completes before any network call
//! begins.

use crate::events::{Chunk, CustomEvent, UiEvent};
use crate::utils::{ids, time};
use parking_lot::Mutex;

/// Buffered significant custom events (`error`, `api-call`,
/// `page-navigation`) that trigger an out-of-band flush
pub const SIGNIFICANT_EVENT_FLUSH_THRESHOLD: usize = 5;

struct Inner {
    ui_events: Vec<UiEvent>,
    custom_events: Vec<CustomEvent>,
    significant_buffered: usize,
    next_chunk_index: u64,
    window_start_ms: u64,
}

/// Live buffer for the active session
pub struct EventBuffer {
    inner: Mutex<Inner>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                ui_events: Vec::new(),
                custom_events: Vec::new(),
                significant_buffered: 0,
                next_chunk_index: 0,
                window_start_ms: time::now_ms(),
            }),
        }
    }

    /// Append a UI event; returns the buffered UI-event count
    pub fn push_ui(&self, event: UiEvent) -> usize {
        let mut inner = self.inner.lock();
        inner.ui_events.push(event);
        inner.ui_events.len()
    }

    /// Append a custom event; returns the buffered significant-event count
    pub fn push_custom(&self, event: CustomEvent) -> usize {
        let mut inner = self.inner.lock();
        if event.is_significant() {
            inner.significant_buffered += 1;
        }
        inner.custom_events.push(event);
        inner.significant_buffered
    }

    /// Atomically swap out everything buffered as a new chunk
    ///
    /// Assigns the next chunk index; indices are strictly increasing and
    /// gap-free in creation order. Returns None when nothing is buffered.
    pub fn take_chunk(&self, session_id: &str, compressed: bool) -> Option<Chunk> {
        let mut inner = self.inner.lock();
        if inner.ui_events.is_empty() && inner.custom_events.is_empty() {
            return None;
        }

        let events = std::mem::take(&mut inner.ui_events);
        let custom_events = std::mem::take(&mut inner.custom_events);
        inner.significant_buffered = 0;

        let index = inner.next_chunk_index;
        inner.next_chunk_index += 1;

        let window_end_ms = time::now_ms();
        let window_start_ms = std::mem::replace(&mut inner.window_start_ms, window_end_ms);

        Some(Chunk {
            chunk_id: ids::chunk_id(),
            session_id: session_id.to_string(),
            index,
            events,
            custom_events,
            window_start_ms,
            window_end_ms,
            compressed,
        })
    }

    /// Return a failed chunk's events to the front of the live buffer
    ///
    /// The events keep their relative order and precede anything captured
    /// since the failed flush; the chunk's index is not reused.
    pub fn requeue(&self, chunk: Chunk) {
        let mut inner = self.inner.lock();

        let significant = chunk
            .custom_events
            .iter()
            .filter(|e| e.is_significant())
            .count();
        inner.significant_buffered += significant;

        let mut ui_events = chunk.events;
        ui_events.append(&mut inner.ui_events);
        inner.ui_events = ui_events;

        let mut custom_events = chunk.custom_events;
        custom_events.append(&mut inner.custom_events);
        inner.custom_events = custom_events;

        inner.window_start_ms = inner.window_start_ms.min(chunk.window_start_ms);
    }

    /// Buffered UI-event count
    pub fn ui_len(&self) -> usize {
        self.inner.lock().ui_events.len()
    }

    /// Buffered custom-event count
    pub fn custom_len(&self) -> usize {
        self.inner.lock().custom_events.len()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock();
        inner.ui_events.is_empty() && inner.custom_events.is_empty()
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}
