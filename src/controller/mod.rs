// src/controller/mod.rs
//! Session lifecycle controller
//!
//! Composes the recording engine adapter, instrumentation hooks, event
//! buffer, flusher and transport behind a single `SessionRecorder` with
//! `start` / `stop` / `track_custom_event`. Exactly one session is active
//! per recorder; the process-wide singleton lives in `registry`.
//!
//! Lifecycle: idle → starting → recording → stopping → stopped, where an
//! eligibility failure during `starting` returns to idle without side
//! effects. The host never observes an error from the background paths;
//! everything is absorbed and logged.

pub mod registry;

use crate::config::RecorderConfig;
use crate::engine::{EngineAdapter, EngineHandle, RecordingEngine};
use crate::events::{CustomEvent, CustomEventData, Session, UserIdentity};
use crate::hooks::{
    install_error_hook, install_navigation_hooks, install_network_hook, install_rejection_hook,
    ApiCallFilter, HookRegistry, TrackFn,
};
use crate::host::HostGlobals;
use crate::metadata::ClientContext;
use crate::recording::buffer::{EventBuffer, SIGNIFICANT_EVENT_FLUSH_THRESHOLD};
use crate::recording::flusher::{Flusher, RecorderStats};
use crate::transport::Collector;
use crate::utils::errors::Result;
use crate::utils::ids;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle state held across start/stop
struct ActiveSession {
    session: Session,
    flusher: Arc<Flusher>,
    flush_task: JoinHandle<()>,
    flush_shutdown: Arc<Notify>,
    engine_handle: EngineHandle,
    hooks: HookRegistry,
    pages: Arc<Mutex<HashSet<String>>>,
}

/// Capture fast path, readable without the lifecycle lock so hook callbacks
/// and `track_custom_event` stay synchronous and cheap
struct ActiveCapture {
    buffer: Arc<EventBuffer>,
    flush_notify: Arc<Notify>,
}

/// The session recorder
pub struct SessionRecorder {
    config: RecorderConfig,
    identity: UserIdentity,
    host: Arc<HostGlobals>,
    adapter: EngineAdapter,
    collector: Arc<dyn Collector>,
    state: tokio::sync::Mutex<Option<ActiveSession>>,
    capture: RwLock<Option<ActiveCapture>>,
    recording: AtomicBool,
    last_stats: Mutex<RecorderStats>,
}

impl SessionRecorder {
    /// Create a recorder; does not start anything
    pub fn new(
        config: RecorderConfig,
        identity: UserIdentity,
        host: Arc<HostGlobals>,
        engine: Arc<dyn RecordingEngine>,
        collector: Arc<dyn Collector>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            identity,
            host,
            adapter: EngineAdapter::new(engine),
            collector,
            state: tokio::sync::Mutex::new(None),
            capture: RwLock::new(None),
            recording: AtomicBool::new(false),
            last_stats: Mutex::new(RecorderStats::default()),
        }))
    }

    /// Begin recording a session
    ///
    /// No-op when already recording, when recording is disabled, or when the
    /// eligibility gate excludes the caller's role; each case is logged at
    /// debug level and leaves no side effects.
    pub async fn start(self: &Arc<Self>, context: ClientContext) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.is_some() {
            debug!("start() ignored: session already recording");
            return Ok(());
        }
        if !self.config.enabled {
            debug!("start() ignored: recording disabled by config");
            return Ok(());
        }
        if !self.config.role_is_eligible(&self.identity.role) {
            debug!(
                role = %self.identity.role,
                "start() ignored: role not eligible for recording"
            );
            return Ok(());
        }

        let session_id = ids::session_id();
        let initial_path = context.path.clone();
        let metadata = context.into_metadata();

        // Best-effort: a failed start notification never blocks recording
        if let Err(e) = self.collector.start_session(&session_id, &metadata).await {
            warn!(
                session_id = %session_id,
                "Failed to notify collector of session start, recording proceeds locally: {}", e
            );
        }

        let buffer = Arc::new(EventBuffer::new());
        let flush_notify = Arc::new(Notify::new());
        let flush_shutdown = Arc::new(Notify::new());
        let flusher = Flusher::new(
            Arc::clone(&buffer),
            Arc::clone(&self.collector),
            session_id.clone(),
            self.config.compress_chunks,
        );

        // Engine first: a session without UI capture is pointless, and
        // failing here leaves nothing to unwind
        let engine_handle =
            self.adapter
                .start(&self.config, Arc::clone(&buffer), Arc::clone(&flush_notify))?;

        let track = self.track_fn(Arc::clone(&buffer), Arc::clone(&flush_notify));
        let pages = Arc::new(Mutex::new(HashSet::new()));

        let mut hooks = HookRegistry::new();
        hooks.add(install_error_hook(&self.host, Arc::clone(&track)));
        hooks.add(install_rejection_hook(&self.host, Arc::clone(&track)));
        hooks.add(install_network_hook(
            &self.host,
            Arc::clone(&track),
            ApiCallFilter::from_config(&self.config),
        ));
        hooks.add_all(install_navigation_hooks(
            &self.host,
            Arc::clone(&track),
            Arc::clone(&pages),
        ));

        let flush_task = flusher.spawn_loop(
            self.config.chunk_interval_ms,
            Arc::clone(&flush_notify),
            Arc::clone(&flush_shutdown),
        );

        *self.capture.write() = Some(ActiveCapture {
            buffer,
            flush_notify,
        });
        self.recording.store(true, Ordering::SeqCst);

        // The session opens on the current page
        pages.lock().insert(initial_path.clone());
        track(CustomEventData::PageNavigation {
            from_path: None,
            to_path: initial_path,
        });

        info!(
            session_id = %session_id,
            user_id = %self.identity.user_id,
            hooks = hooks.len(),
            "Session recording started"
        );

        *state = Some(ActiveSession {
            session: Session::begin(session_id, self.identity.clone()),
            flusher,
            flush_task,
            flush_shutdown,
            engine_handle,
            hooks,
            pages,
        });
        Ok(())
    }

    /// Stop the active session
    ///
    /// Stops the engine, winds down the flush loop, performs one final flush
    /// (waiting out any in-flight flush first), notifies the collector with
    /// the distinct pages visited, and restores every instrumentation hook
    /// in reverse install order. Idempotent: stopping when idle is a
    /// debug-level no-op.
    pub async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        let mut active = match state.take() {
            Some(active) => active,
            None => {
                debug!("stop() ignored: no active session");
                return Ok(());
            }
        };

        self.recording.store(false, Ordering::SeqCst);

        // 1. No more UI events
        active.engine_handle.stop();

        // 2. Wind down the timer; joining guarantees any in-flight flush
        //    has fully resolved before the final one below
        active.flush_shutdown.notify_one();
        if let Err(e) = active.flush_task.await {
            if !e.is_cancelled() {
                warn!("Flush loop ended abnormally: {}", e);
            }
        }

        // 3. Final flush, awaited before stop() returns
        active.flusher.flush().await;
        *self.capture.write() = None;

        // 4. Session end notification with the visited-page set
        let mut pages_visited: Vec<String> = active.pages.lock().iter().cloned().collect();
        pages_visited.sort();
        if let Err(e) = self
            .collector
            .end_session(&active.session.session_id, &pages_visited)
            .await
        {
            warn!(
                session_id = %active.session.session_id,
                "Failed to notify collector of session end: {}", e
            );
        }

        // 5. Hooks go back exactly as found, newest first
        active.hooks.restore_all();

        active.session.complete();
        *self.last_stats.lock() = active.flusher.stats();

        info!(
            session_id = %active.session.session_id,
            duration_ms = active.session.duration_ms(),
            pages = pages_visited.len(),
            "Session recording stopped"
        );
        Ok(())
    }

    /// Record an application-level custom event
    ///
    /// Assigns the event id and capture timestamp. Ignored (debug log) when
    /// no session is recording. Returns the generated event id.
    pub fn track_custom_event(&self, data: CustomEventData) -> Option<String> {
        let capture = self.capture.read();
        let capture = match capture.as_ref() {
            Some(capture) => capture,
            None => {
                debug!("track_custom_event ignored: no active session");
                return None;
            }
        };

        let event = CustomEvent::now(data);
        let id = event.id.clone();
        let significant = capture.buffer.push_custom(event);
        if significant >= SIGNIFICANT_EVENT_FLUSH_THRESHOLD {
            debug!(significant, "Significant-event threshold reached; requesting flush");
            capture.flush_notify.notify_one();
        }
        Some(id)
    }

    /// Whether a session is currently recording
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Id of the active session, if any
    pub async fn session_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .as_ref()
            .map(|active| active.session.session_id.clone())
    }

    /// Delivery counters: live for the active session, otherwise the final
    /// counters of the last completed one
    pub async fn stats(&self) -> RecorderStats {
        if let Some(active) = self.state.lock().await.as_ref() {
            return active.flusher.stats();
        }
        self.last_stats.lock().clone()
    }

    fn track_fn(&self, buffer: Arc<EventBuffer>, flush_notify: Arc<Notify>) -> TrackFn {
        Arc::new(move |data: CustomEventData| {
            let significant = buffer.push_custom(CustomEvent::now(data));
            if significant >= SIGNIFICANT_EVENT_FLUSH_THRESHOLD {
                flush_notify.notify_one();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineOptions, UiEventSink};
    use crate::events::{Chunk, SessionMetadata, UiEvent};
    use crate::utils::errors::RecorderError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Collector recording every interaction, with switchable send failures
    /// and an optional artificial delay to simulate a slow network
    struct TestCollector {
        starts: Mutex<Vec<String>>,
        chunks: Mutex<Vec<Chunk>>,
        ends: Mutex<Vec<(String, Vec<String>)>>,
        fail_sends: AtomicBool,
        send_delay_ms: AtomicUsize,
    }

    impl TestCollector {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                starts: Mutex::new(Vec::new()),
                chunks: Mutex::new(Vec::new()),
                ends: Mutex::new(Vec::new()),
                fail_sends: AtomicBool::new(false),
                send_delay_ms: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Collector for TestCollector {
        async fn start_session(&self, session_id: &str, _: &SessionMetadata) -> Result<()> {
            self.starts.lock().push(session_id.to_string());
            Ok(())
        }

        async fn send_chunk(&self, chunk: &Chunk) -> Result<()> {
            let delay = self.send_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            }
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(RecorderError::Collector("connection refused".to_string()));
            }
            self.chunks.lock().push(chunk.clone());
            Ok(())
        }

        async fn end_session(&self, session_id: &str, pages: &[String]) -> Result<()> {
            self.ends
                .lock()
                .push((session_id.to_string(), pages.to_vec()));
            Ok(())
        }
    }

    /// Engine stub exposing its sink so tests can emit UI events
    struct StubEngine {
        sink: Mutex<Option<UiEventSink>>,
        starts: AtomicUsize,
    }

    impl StubEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sink: Mutex::new(None),
                starts: AtomicUsize::new(0),
            })
        }

        fn emit(&self, ts: u64) {
            let sink = self.sink.lock().clone().expect("engine not started");
            sink(UiEvent::new(ts, serde_json::json!({"t": ts})));
        }
    }

    impl RecordingEngine for StubEngine {
        fn start(&self, _: EngineOptions, sink: UiEventSink) -> Result<EngineHandle> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.sink.lock() = Some(sink);
            Ok(EngineHandle::new(|| {}))
        }
    }

    fn identity(role: &str) -> UserIdentity {
        UserIdentity {
            user_id: "usr_1".to_string(),
            role: role.to_string(),
            email: Some("someone@example.com".to_string()),
        }
    }

    fn context() -> ClientContext {
        ClientContext {
            user_agent: "Mozilla/5.0 (Macintosh) Chrome/120.0.0.0 Safari/537.36".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            viewport_width: 1280,
            viewport_height: 720,
            pixel_ratio: 1.0,
            locale: "en-US".to_string(),
            timezone: "UTC".to_string(),
            url: "https://app.example.com/home".to_string(),
            referrer: None,
            path: "/home".to_string(),
        }
    }

    fn recorder_with(
        config: RecorderConfig,
        role: &str,
    ) -> (Arc<SessionRecorder>, Arc<StubEngine>, Arc<TestCollector>, Arc<HostGlobals>) {
        let engine = StubEngine::new();
        let collector = TestCollector::new();
        let host = HostGlobals::new("/home");
        host.set_error_handler(Arc::new(|_| {}));
        host.set_rejection_handler(Arc::new(|_| {}));
        host.set_fetch(Arc::new(|_| {
            Box::pin(futures::future::ready(crate::host::FetchOutcome {
                status: 200,
                error: None,
            }))
        }));

        let recorder = SessionRecorder::new(
            config,
            identity(role),
            Arc::clone(&host),
            engine.clone(),
            collector.clone(),
        )
        .unwrap();
        (recorder, engine, collector, host)
    }

    fn default_config() -> RecorderConfig {
        RecorderConfig {
            chunk_interval_ms: 60_000,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_start_stop_roundtrip() {
        let (recorder, engine, collector, _host) = recorder_with(default_config(), "beta");

        recorder.start(context()).await.unwrap();
        assert!(recorder.is_recording());
        assert_eq!(collector.starts.lock().len(), 1);

        engine.emit(1);
        recorder.stop().await.unwrap();

        assert!(!recorder.is_recording());
        assert_eq!(collector.ends.lock().len(), 1);
        // Final flush delivered the UI event plus the initial navigation
        let chunks = collector.chunks.lock();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].events.len(), 1);
        assert_eq!(chunks[0].custom_events.len(), 1);
    }

    #[tokio::test]
    async fn test_ineligible_role_makes_no_server_calls() {
        let (recorder, _engine, collector, _host) = recorder_with(default_config(), "member");

        recorder.start(context()).await.unwrap();
        assert!(!recorder.is_recording());
        assert!(collector.starts.lock().is_empty());

        recorder.stop().await.unwrap();
        assert!(collector.ends.lock().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_config_is_noop() {
        let config = RecorderConfig {
            enabled: false,
            ..default_config()
        };
        let (recorder, _engine, collector, _host) = recorder_with(config, "beta");

        recorder.start(context()).await.unwrap();
        assert!(!recorder.is_recording());
        assert!(collector.starts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let (recorder, _engine, collector, _host) = recorder_with(default_config(), "beta");
        recorder.stop().await.unwrap();
        assert!(collector.chunks.lock().is_empty());
        assert!(collector.ends.lock().is_empty());
    }

    #[tokio::test]
    async fn test_double_start_installs_hooks_once() {
        let (recorder, engine, _collector, host) = recorder_with(default_config(), "beta");

        recorder.start(context()).await.unwrap();
        recorder.start(context()).await.unwrap();
        assert_eq!(engine.starts.load(Ordering::SeqCst), 1);

        // A single wrapper layer: restoring once gets the original back
        recorder.stop().await.unwrap();
        let original = host.swap_error_handler(None);
        assert!(original.is_some());
        // The slot content after stop is the pre-start handler, not a wrapper
        // chaining to itself; a second stop changes nothing
        host.swap_error_handler(original);
        recorder.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_track_order_preserved() {
        let (recorder, _engine, collector, _host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();

        for i in 0..4 {
            recorder.track_custom_event(CustomEventData::UserAction {
                action: format!("action-{}", i),
                element: None,
            });
        }
        recorder.stop().await.unwrap();

        let chunks = collector.chunks.lock();
        let actions: Vec<String> = chunks[0]
            .custom_events
            .iter()
            .filter_map(|e| match &e.data {
                CustomEventData::UserAction { action, .. } => Some(action.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec!["action-0", "action-1", "action-2", "action-3"]);
    }

    #[tokio::test]
    async fn test_five_significant_events_flush_out_of_band() {
        let (recorder, _engine, collector, _host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();

        // Initial navigation is the first significant event
        recorder.track_custom_event(CustomEventData::Error {
            message: "boom".to_string(),
            stack: None,
            error_type: "Error".to_string(),
            source: None,
        });
        for i in 0..3 {
            recorder.track_custom_event(CustomEventData::ApiCall {
                url: format!("/api/call/{}", i),
                method: "GET".to_string(),
                status: 200,
                duration_ms: 5,
                error: None,
            });
        }

        // Five significant events buffered; the flush loop (60s interval)
        // can only have been woken by the threshold
        for _ in 0..50 {
            if !collector.chunks.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(collector.chunks.lock().len(), 1);
        assert_eq!(collector.chunks.lock()[0].custom_events.len(), 5);

        recorder.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_send_redelivered_in_order() {
        let (recorder, engine, collector, _host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();

        engine.emit(1);
        engine.emit(2);
        collector.fail_sends.store(true, Ordering::SeqCst);

        // Force a flush attempt that fails
        let state = recorder.state.lock().await;
        let flusher = Arc::clone(&state.as_ref().unwrap().flusher);
        drop(state);
        flusher.flush().await;
        assert!(collector.chunks.lock().is_empty());

        engine.emit(3);
        collector.fail_sends.store(false, Ordering::SeqCst);
        recorder.stop().await.unwrap();

        let chunks = collector.chunks.lock();
        assert_eq!(chunks.len(), 1);
        let order: Vec<u64> = chunks[0].events.iter().map(|e| e.timestamp_ms).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stop_waits_for_inflight_flush() {
        let (recorder, engine, collector, _host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();

        engine.emit(1);
        collector.send_delay_ms.store(200, Ordering::SeqCst);

        // Kick an out-of-band flush that will sit in the slow send
        let capture_notify = {
            let state = recorder.state.lock().await;
            let flusher = Arc::clone(&state.as_ref().unwrap().flusher);
            drop(state);
            tokio::spawn(async move { flusher.flush().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.emit(2);

        recorder.stop().await.unwrap();
        capture_notify.await.unwrap();

        // Both the slow flush and the final flush landed before stop returned
        let chunks = collector.chunks.lock();
        let total: usize = chunks.iter().map(|c| c.events.len()).sum();
        assert_eq!(total, 2);
        assert_eq!(collector.ends.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_navigation_hook_feeds_visited_pages() {
        let (recorder, _engine, collector, host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();

        host.push_state("/projects");
        host.push_state("/projects/42");
        recorder.stop().await.unwrap();

        let ends = collector.ends.lock();
        let (_, pages) = &ends[0];
        assert_eq!(
            pages,
            &vec![
                "/home".to_string(),
                "/projects".to_string(),
                "/projects/42".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_track_after_stop_is_ignored() {
        let (recorder, _engine, _collector, _host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();
        recorder.stop().await.unwrap();

        let id = recorder.track_custom_event(CustomEventData::UserAction {
            action: "late".to_string(),
            element: None,
        });
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_stats_survive_stop() {
        let (recorder, engine, _collector, _host) = recorder_with(default_config(), "beta");
        recorder.start(context()).await.unwrap();
        engine.emit(1);
        recorder.stop().await.unwrap();

        let stats = recorder.stats().await;
        assert_eq!(stats.chunks_sent, 1);
        assert!(stats.events_sent >= 2);
    }
}
