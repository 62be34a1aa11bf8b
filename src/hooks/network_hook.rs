// src/hooks/network_hook.rs
//! Outbound network-call interception
//!
//! Wraps the host's fetch slot with a version that times the call and
//! records an `api-call` custom event with url, method, status (0 on
//! network failure) and duration. Two exclusions keep this safe and
//! private: calls to the collection endpoint itself are never instrumented
//! (they would recurse), and only same-origin, internal-API-prefixed URLs
//! are recorded so third-party request details never leak into a session.

use crate::config::RecorderConfig;
use crate::events::CustomEventData;
use crate::hooks::{InstalledHook, TrackFn};
use crate::host::{FetchFn, FetchRequest, HostGlobals};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Decides which outbound URLs are recorded
#[derive(Debug, Clone)]
pub struct ApiCallFilter {
    /// Path of the collection endpoint (always excluded)
    endpoint_path: String,
    /// Path prefix identifying internal API calls
    internal_prefix: String,
    /// Application origin for absolute URLs; None restricts instrumentation
    /// to relative URLs
    app_origin: Option<Url>,
}

impl ApiCallFilter {
    pub fn from_config(config: &RecorderConfig) -> Self {
        let endpoint_path = match Url::parse(&config.endpoint) {
            Ok(url) => url.path().to_string(),
            Err(_) => config.endpoint.clone(),
        };
        let app_origin = config
            .app_origin
            .as_deref()
            .and_then(|origin| Url::parse(origin).ok());

        Self {
            endpoint_path,
            internal_prefix: config.internal_api_prefix.clone(),
            app_origin,
        }
    }

    /// Whether a call to `raw_url` should produce an `api-call` event
    pub fn should_instrument(&self, raw_url: &str) -> bool {
        let path = match self.request_path(raw_url) {
            Some(path) => path,
            None => return false,
        };

        if path.starts_with(&self.endpoint_path) {
            return false;
        }
        path.starts_with(&self.internal_prefix)
    }

    /// Resolve the request path, rejecting cross-origin absolute URLs
    fn request_path(&self, raw_url: &str) -> Option<String> {
        if raw_url.starts_with('/') {
            return Some(raw_url.to_string());
        }

        let url = Url::parse(raw_url).ok()?;
        let origin = self.app_origin.as_ref()?;
        if url.origin() != origin.origin() {
            return None;
        }
        Some(url.path().to_string())
    }
}

/// Wrap the host's fetch slot
pub fn install_network_hook(
    host: &Arc<HostGlobals>,
    track: TrackFn,
    filter: ApiCallFilter,
) -> Option<InstalledHook> {
    if !host.fetch_registered() {
        debug!("No fetch capability registered; skipping network hook");
        return None;
    }

    let original = host.swap_fetch(None)?;
    let inner = Arc::clone(&original);
    let wrapper: FetchFn = Arc::new(move |request: FetchRequest| {
        if !filter.should_instrument(&request.url) {
            return inner(request);
        }

        let url = request.url.clone();
        let method = request.method.clone();
        let track = Arc::clone(&track);
        let started = Instant::now();
        let fut = inner(request);

        Box::pin(async move {
            let outcome = fut.await;
            track(CustomEventData::ApiCall {
                url,
                method,
                status: outcome.status,
                duration_ms: started.elapsed().as_millis() as u64,
                error: outcome.error.clone(),
            });
            outcome
        })
    });
    host.swap_fetch(Some(wrapper));

    let host = Arc::clone(host);
    Some(InstalledHook::new("fetch", move || {
        host.swap_fetch(Some(original));
    }))
}
