// src/hooks/navigation_hook.rs
//! History-navigation interception
//!
//! Wraps the two programmatic history functions and listens for the
//! back/forward event. Any path change produces a `page-navigation` custom
//! event and adds the new path to the session's visited-page set.

use crate::events::CustomEventData;
use crate::hooks::{InstalledHook, TrackFn};
use crate::host::{HostGlobals, NavigateFn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Distinct pages visited during the session, shared with the controller
pub type VisitedPages = Arc<Mutex<HashSet<String>>>;

fn wrap_navigate(
    host: &Arc<HostGlobals>,
    original: NavigateFn,
    track: TrackFn,
    pages: VisitedPages,
) -> NavigateFn {
    let host = Arc::clone(host);
    Arc::new(move |path: &str| {
        let from = host.current_path();
        original(path);
        // The built-in slot already tracks the path; a host-supplied slot
        // may not, so bookkeeping is repeated here.
        host.set_current_path(path);

        if from != path {
            pages.lock().insert(path.to_string());
            track(CustomEventData::PageNavigation {
                from_path: Some(from),
                to_path: path.to_string(),
            });
        }
    })
}

/// Wrap push/replace navigation and register a popstate listener
pub fn install_navigation_hooks(
    host: &Arc<HostGlobals>,
    track: TrackFn,
    pages: VisitedPages,
) -> Vec<InstalledHook> {
    let mut hooks = Vec::new();

    if let Some(original) = host.swap_push_state(None) {
        let wrapper = wrap_navigate(host, Arc::clone(&original), Arc::clone(&track), Arc::clone(&pages));
        host.swap_push_state(Some(wrapper));
        let host = Arc::clone(host);
        hooks.push(InstalledHook::new("history-push", move || {
            host.swap_push_state(Some(original));
        }));
    }

    if let Some(original) = host.swap_replace_state(None) {
        let wrapper = wrap_navigate(host, Arc::clone(&original), Arc::clone(&track), Arc::clone(&pages));
        host.swap_replace_state(Some(wrapper));
        let host = Arc::clone(host);
        hooks.push(InstalledHook::new("history-replace", move || {
            host.swap_replace_state(Some(original));
        }));
    }

    let listener_pages = Arc::clone(&pages);
    let listener_track = Arc::clone(&track);
    let listener_id = host.add_popstate_listener(Arc::new(move |from: &str, to: &str| {
        if from != to {
            listener_pages.lock().insert(to.to_string());
            listener_track(CustomEventData::PageNavigation {
                from_path: Some(from.to_string()),
                to_path: to.to_string(),
            });
        }
    }));
    let host = Arc::clone(host);
    hooks.push(InstalledHook::new("popstate", move || {
        host.remove_popstate_listener(listener_id);
    }));

    hooks
}
