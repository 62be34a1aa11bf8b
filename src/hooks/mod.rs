// src/hooks/mod.rs
//! Instrumentation hooks
//!
//! Transparent interception of host-application globals while a session
//! records:
//!
//! - **error_hook**: Global error and unhandled-rejection handlers
//! - **network_hook**: Outbound fetch calls (internal API only)
//! - **navigation_hook**: History push/replace and back/forward
//!
//! Each installed hook is a value object holding a restore closure over the
//! exact original slot content. The registry restores in reverse install
//! order so repeated start/stop cycles never leave stacked wrappers, and its
//! `Drop` impl restores anything still installed if the controller unwinds.

pub mod error_hook;
pub mod navigation_hook;
pub mod network_hook;

use crate::events::CustomEventData;
use std::sync::Arc;
use tracing::debug;

pub use error_hook::{install_error_hook, install_rejection_hook};
pub use navigation_hook::install_navigation_hooks;
pub use network_hook::{install_network_hook, ApiCallFilter};

/// Callback the hooks use to record a custom event
pub type TrackFn = Arc<dyn Fn(CustomEventData) + Send + Sync>;

/// A wrapped global, with the means to put the original back
pub struct InstalledHook {
    name: &'static str,
    restore: Option<Box<dyn FnOnce() + Send>>,
}

impl InstalledHook {
    pub fn new(name: &'static str, restore: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name,
            restore: Some(Box::new(restore)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn restore(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
            debug!(hook = self.name, "Restored instrumentation hook");
        }
    }
}

/// The set of hooks installed for one session
#[derive(Default)]
pub struct HookRegistry {
    installed: Vec<InstalledHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed hook; `None` means the global was unavailable and
    /// the hook was skipped
    pub fn add(&mut self, hook: Option<InstalledHook>) {
        if let Some(hook) = hook {
            debug!(hook = hook.name, "Installed instrumentation hook");
            self.installed.push(hook);
        }
    }

    pub fn add_all(&mut self, hooks: Vec<InstalledHook>) {
        for hook in hooks {
            self.add(Some(hook));
        }
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    /// Restore every hook, most recently installed first. Idempotent.
    pub fn restore_all(&mut self) {
        while let Some(mut hook) = self.installed.pop() {
            hook.restore();
        }
    }
}

impl Drop for HookRegistry {
    fn drop(&mut self) {
        self.restore_all();
    }
}
