// src/recording/flusher.rs
//! Background flush loop
//!
//! One flusher exists per active session. Flushes are requested by three
//! independent triggers: the periodic interval, the UI-event budget (via the
//! notify handle the engine adapter holds), and the significant-event
//! threshold in the controller. An async gate serializes the actual flush
//! work so a timer tick during a slow send waits instead of double-flushing,
//! while events keep accumulating in the live buffer; `stop()`'s final flush
//! takes the same gate and therefore waits for any in-flight send.

use crate::recording::buffer::EventBuffer;
use crate::transport::Collector;
use crate::utils::errors::RecorderError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Delivery counters for the active session
#[derive(Debug, Clone, Default)]
pub struct RecorderStats {
    pub chunks_created: u64,
    pub chunks_sent: u64,
    pub chunks_requeued: u64,
    pub chunks_dropped: u64,
    pub events_sent: u64,
}

/// Drains the buffer into chunks and hands them to the collector
pub struct Flusher {
    buffer: Arc<EventBuffer>,
    collector: Arc<dyn Collector>,
    session_id: String,
    compress: bool,
    gate: tokio::sync::Mutex<()>,
    stats: Arc<Mutex<RecorderStats>>,
}

impl Flusher {
    pub fn new(
        buffer: Arc<EventBuffer>,
        collector: Arc<dyn Collector>,
        session_id: String,
        compress: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            buffer,
            collector,
            session_id,
            compress,
            gate: tokio::sync::Mutex::new(()),
            stats: Arc::new(Mutex::new(RecorderStats::default())),
        })
    }

    /// Flush everything buffered as one chunk
    ///
    /// The buffer swap happens before the network call begins, so events
    /// captured during a slow send accumulate in a fresh buffer. On a failed
    /// send the chunk's events return to the front of the live buffer; on a
    /// serialization failure the chunk is dropped so one malformed payload
    /// cannot block every future flush.
    pub async fn flush(&self) {
        let _gate = self.gate.lock().await;

        let chunk = match self.buffer.take_chunk(&self.session_id, self.compress) {
            Some(chunk) => chunk,
            None => return,
        };
        self.stats.lock().chunks_created += 1;

        let event_count = chunk.event_count() as u64;
        match self.collector.send_chunk(&chunk).await {
            Ok(()) => {
                let mut stats = self.stats.lock();
                stats.chunks_sent += 1;
                stats.events_sent += event_count;
            }
            Err(RecorderError::Serialization(e)) => {
                error!(
                    chunk_id = %chunk.chunk_id,
                    "Dropping unserializable chunk: {}", e
                );
                self.stats.lock().chunks_dropped += 1;
            }
            Err(e) => {
                warn!(
                    chunk_id = %chunk.chunk_id,
                    events = event_count,
                    "Chunk delivery failed, requeueing: {}", e
                );
                self.stats.lock().chunks_requeued += 1;
                self.buffer.requeue(chunk);
            }
        }
    }

    /// Spawn the periodic flush loop
    ///
    /// `notify` requests an out-of-band flush; `shutdown` ends the loop.
    /// Shutdown is cooperative rather than an abort so an in-flight send is
    /// never dropped mid-delivery: the loop finishes the current flush, then
    /// exits, and `stop()` awaits the join handle before its final flush.
    pub fn spawn_loop(
        self: &Arc<Self>,
        interval_ms: u64,
        notify: Arc<Notify>,
        shutdown: Arc<Notify>,
    ) -> JoinHandle<()> {
        let flusher = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
            // The first tick fires immediately; skip it so the first flush
            // happens one full interval after start
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        debug!("Periodic flush tick");
                    }
                    _ = notify.notified() => {
                        debug!("Out-of-band flush requested");
                    }
                    _ = shutdown.notified() => {
                        debug!("Flush loop shutting down");
                        break;
                    }
                }
                flusher.flush().await;
            }
        })
    }

    /// Snapshot of the delivery counters
    pub fn stats(&self) -> RecorderStats {
        self.stats.lock().clone()
    }
}
