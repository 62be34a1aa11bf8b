// src/host/mod.rs
//! Host application globals
//!
//! An explicit slot container standing in for the platform globals the
//! instrumentation layer observes: the global error handler, the
//! unhandled-rejection handler, the outbound fetch function, and the two
//! programmatic history-navigation functions. The host application calls
//! through these slots; instrumentation hooks swap wrappers in while a
//! session records and restore the exact original values afterwards.
//!
//! Every slot is an optional capability. A host that never registers a fetch
//! function simply doesn't get network instrumentation; the other hooks are
//! unaffected.

use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An error observed by the host's global error reporting
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub stack: Option<String>,
    pub error_type: String,
    /// Source location (file:line:column) when available
    pub source: Option<String>,
}

/// Outbound network request, as seen by the fetch slot
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
}

/// Outcome of a fetch call
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// HTTP status, or 0 on network failure
    pub status: u16,
    pub error: Option<String>,
}

pub type ErrorHandler = Arc<dyn Fn(&ErrorReport) + Send + Sync>;
pub type FetchFn = Arc<dyn Fn(FetchRequest) -> BoxFuture<'static, FetchOutcome> + Send + Sync>;
pub type NavigateFn = Arc<dyn Fn(&str) + Send + Sync>;
/// Popstate listener, invoked with (previous path, new path)
pub type PopStateListener = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Handle for removing a popstate listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// A replaceable global slot
struct Slot<T: Clone>(RwLock<Option<T>>);

impl<T: Clone> Slot<T> {
    fn new(value: Option<T>) -> Self {
        Self(RwLock::new(value))
    }

    fn get(&self) -> Option<T> {
        self.0.read().clone()
    }

    fn is_registered(&self) -> bool {
        self.0.read().is_some()
    }

    /// Replace the slot content, returning what was there
    fn swap(&self, value: Option<T>) -> Option<T> {
        std::mem::replace(&mut *self.0.write(), value)
    }
}

/// The host's replaceable globals
pub struct HostGlobals {
    error_handler: Slot<ErrorHandler>,
    rejection_handler: Slot<ErrorHandler>,
    fetch: Slot<FetchFn>,
    push_state: Slot<NavigateFn>,
    replace_state: Slot<NavigateFn>,
    popstate_listeners: RwLock<Vec<(ListenerId, PopStateListener)>>,
    next_listener_id: AtomicU64,
    current_path: Arc<RwLock<String>>,
}

impl HostGlobals {
    /// Create a host-globals container
    ///
    /// The history slots default to path bookkeeping only; hosts layer their
    /// real navigation on top by registering their own functions. The error,
    /// rejection and fetch slots start empty.
    pub fn new(initial_path: &str) -> Arc<Self> {
        let current_path = Arc::new(RwLock::new(initial_path.to_string()));

        let push_cell = Arc::clone(&current_path);
        let push_state: NavigateFn = Arc::new(move |path: &str| {
            *push_cell.write() = path.to_string();
        });
        let replace_cell = Arc::clone(&current_path);
        let replace_state: NavigateFn = Arc::new(move |path: &str| {
            *replace_cell.write() = path.to_string();
        });

        Arc::new(Self {
            error_handler: Slot::new(None),
            rejection_handler: Slot::new(None),
            fetch: Slot::new(None),
            push_state: Slot::new(Some(push_state)),
            replace_state: Slot::new(Some(replace_state)),
            popstate_listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            current_path,
        })
    }

    // ---- host-facing call surface ----

    /// Report a synchronous error through the global handler
    pub fn report_error(&self, report: &ErrorReport) {
        if let Some(handler) = self.error_handler.get() {
            handler(report);
        }
    }

    /// Report an unhandled promise rejection
    pub fn report_rejection(&self, report: &ErrorReport) {
        if let Some(handler) = self.rejection_handler.get() {
            handler(report);
        }
    }

    /// Issue an outbound network call through the fetch slot
    pub fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, FetchOutcome> {
        match self.fetch.get() {
            Some(f) => f(request),
            None => Box::pin(futures::future::ready(FetchOutcome {
                status: 0,
                error: Some("no fetch capability registered".to_string()),
            })),
        }
    }

    /// Programmatic navigation (history push)
    pub fn push_state(&self, path: &str) {
        if let Some(f) = self.push_state.get() {
            f(path);
        }
    }

    /// Programmatic navigation (history replace)
    pub fn replace_state(&self, path: &str) {
        if let Some(f) = self.replace_state.get() {
            f(path);
        }
    }

    /// Browser back/forward arrived at `path`; notifies popstate listeners
    /// with the previous and new path
    pub fn emit_popstate(&self, path: &str) {
        let from = {
            let mut current = self.current_path.write();
            std::mem::replace(&mut *current, path.to_string())
        };
        let listeners: Vec<PopStateListener> = self
            .popstate_listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&from, path);
        }
    }

    /// Current route path
    pub fn current_path(&self) -> String {
        self.current_path.read().clone()
    }

    // ---- registration (host setup) ----

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        self.error_handler.swap(Some(handler));
    }

    pub fn set_rejection_handler(&self, handler: ErrorHandler) {
        self.rejection_handler.swap(Some(handler));
    }

    pub fn set_fetch(&self, fetch: FetchFn) {
        self.fetch.swap(Some(fetch));
    }

    pub fn set_push_state(&self, f: NavigateFn) {
        self.push_state.swap(Some(f));
    }

    pub fn set_replace_state(&self, f: NavigateFn) {
        self.replace_state.swap(Some(f));
    }

    pub fn add_popstate_listener(&self, listener: PopStateListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.popstate_listeners.write().push((id, listener));
        id
    }

    pub fn remove_popstate_listener(&self, id: ListenerId) {
        self.popstate_listeners.write().retain(|(lid, _)| *lid != id);
    }

    /// Record the current path without going through a navigation slot
    /// (used by navigation wrappers that replace the built-in bookkeeping)
    pub fn set_current_path(&self, path: &str) {
        *self.current_path.write() = path.to_string();
    }

    // ---- slot access for instrumentation hooks ----

    pub(crate) fn error_handler_registered(&self) -> bool {
        self.error_handler.is_registered()
    }

    pub(crate) fn rejection_handler_registered(&self) -> bool {
        self.rejection_handler.is_registered()
    }

    pub(crate) fn fetch_registered(&self) -> bool {
        self.fetch.is_registered()
    }

    pub(crate) fn swap_error_handler(&self, value: Option<ErrorHandler>) -> Option<ErrorHandler> {
        self.error_handler.swap(value)
    }

    pub(crate) fn swap_rejection_handler(
        &self,
        value: Option<ErrorHandler>,
    ) -> Option<ErrorHandler> {
        self.rejection_handler.swap(value)
    }

    pub(crate) fn swap_fetch(&self, value: Option<FetchFn>) -> Option<FetchFn> {
        self.fetch.swap(value)
    }

    pub(crate) fn swap_push_state(&self, value: Option<NavigateFn>) -> Option<NavigateFn> {
        self.push_state.swap(value)
    }

    pub(crate) fn swap_replace_state(&self, value: Option<NavigateFn>) -> Option<NavigateFn> {
        self.replace_state.swap(value)
    }
}
