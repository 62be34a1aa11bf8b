// src/controller/registry.rs
//! Process-wide recorder handle
//!
//! Hosts that want a single ambient recorder create it here instead of
//! threading the `Arc` through every call site. The slot is explicit state
//! with a clear owner: `create` builds a recorder and puts it in, `active`
//! hands out clones, `clear` empties it. Nothing in the crate requires the
//! slot; every API also works on a directly-held `Arc<SessionRecorder>`.

use crate::config::RecorderConfig;
use crate::controller::SessionRecorder;
use crate::engine::RecordingEngine;
use crate::events::UserIdentity;
use crate::host::HostGlobals;
use crate::transport::Collector;
use crate::utils::errors::Result;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

static ACTIVE: Lazy<RwLock<Option<Arc<SessionRecorder>>>> = Lazy::new(|| RwLock::new(None));

/// Build a recorder and make it the process-wide instance
///
/// Replacing a live recorder is almost always a bug (the old one keeps its
/// background task until stopped), so a replacement is logged.
pub fn create(
    config: RecorderConfig,
    identity: UserIdentity,
    host: Arc<HostGlobals>,
    engine: Arc<dyn RecordingEngine>,
    collector: Arc<dyn Collector>,
) -> Result<Arc<SessionRecorder>> {
    let recorder = SessionRecorder::new(config, identity, host, engine, collector)?;
    let previous = ACTIVE.write().replace(Arc::clone(&recorder));
    if let Some(previous) = previous {
        if previous.is_recording() {
            warn!("Replaced process-wide recorder while it was still recording");
        }
    }
    Ok(recorder)
}

/// The process-wide recorder, if one has been created
pub fn active() -> Option<Arc<SessionRecorder>> {
    ACTIVE.read().clone()
}

/// Remove the process-wide recorder, returning it so the caller can stop it
pub fn clear() -> Option<Arc<SessionRecorder>> {
    ACTIVE.write().take()
}
