// src/hooks/error_hook.rs
//! Global error and unhandled-rejection interception
//!
//! Wraps the host's error handlers with versions that record an `error`
//! custom event, then chain to the previously-installed handler so host
//! error handling is preserved unchanged.

use crate::events::CustomEventData;
use crate::hooks::{InstalledHook, TrackFn};
use crate::host::{ErrorHandler, ErrorReport, HostGlobals};
use std::sync::Arc;
use tracing::debug;

fn to_event(report: &ErrorReport) -> CustomEventData {
    CustomEventData::Error {
        message: report.message.clone(),
        stack: report.stack.clone(),
        error_type: report.error_type.clone(),
        source: report.source.clone(),
    }
}

/// Wrap the global synchronous-error handler
pub fn install_error_hook(host: &Arc<HostGlobals>, track: TrackFn) -> Option<InstalledHook> {
    if !host.error_handler_registered() {
        debug!("No global error handler registered; skipping error hook");
        return None;
    }

    let original = host.swap_error_handler(None)?;
    let chained = Arc::clone(&original);
    let wrapper: ErrorHandler = Arc::new(move |report: &ErrorReport| {
        track(to_event(report));
        chained(report);
    });
    host.swap_error_handler(Some(wrapper));

    let host = Arc::clone(host);
    Some(InstalledHook::new("error-handler", move || {
        host.swap_error_handler(Some(original));
    }))
}

/// Wrap the global unhandled-rejection handler
pub fn install_rejection_hook(host: &Arc<HostGlobals>, track: TrackFn) -> Option<InstalledHook> {
    if !host.rejection_handler_registered() {
        debug!("No rejection handler registered; skipping rejection hook");
        return None;
    }

    let original = host.swap_rejection_handler(None)?;
    let chained = Arc::clone(&original);
    let wrapper: ErrorHandler = Arc::new(move |report: &ErrorReport| {
        track(to_event(report));
        chained(report);
    });
    host.swap_rejection_handler(Some(wrapper));

    let host = Arc::clone(host);
    Some(InstalledHook::new("rejection-handler", move || {
        host.swap_rejection_handler(Some(original));
    }))
}
