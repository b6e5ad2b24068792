//! Hook registry for breaker events.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::state::State;

type HookFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// A registry of callbacks fired on breaker events.
///
/// Because classification is derived rather than stored, "transitions" are
/// defined at observation boundaries: the open and close hooks fire when a
/// recorded outcome or a `reset` changes the classification, and the
/// half-open hook fires when a trial call is admitted. A breaker whose
/// cooldown window lapses with no traffic fires nothing until the next call.
///
/// Hooks run on the calling thread, outside the breaker's lock; keep them
/// short.
pub struct HookRegistry {
    on_open: RwLock<Option<HookFn>>,
    on_close: RwLock<Option<HookFn>>,
    on_half_open: RwLock<Option<HookFn>>,
    on_success: RwLock<Option<HookFn>>,
    on_failure: RwLock<Option<HookFn>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            on_open: RwLock::new(None),
            on_close: RwLock::new(None),
            on_half_open: RwLock::new(None),
            on_success: RwLock::new(None),
            on_failure: RwLock::new(None),
        }
    }

    /// Sets the hook fired when the breaker trips open.
    pub fn set_on_open<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_open.write() = Some(Arc::new(f));
    }

    /// Sets the hook fired when the breaker returns to closed.
    pub fn set_on_close<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_close.write() = Some(Arc::new(f));
    }

    /// Sets the hook fired when a half-open trial call is admitted.
    pub fn set_on_half_open<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_half_open.write() = Some(Arc::new(f));
    }

    /// Sets the hook fired after every successful call.
    pub fn set_on_success<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_success.write() = Some(Arc::new(f));
    }

    /// Sets the hook fired after every failed call.
    pub fn set_on_failure<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_failure.write() = Some(Arc::new(f));
    }

    pub(crate) fn fire_transition(&self, to: State) {
        let slot = match to {
            State::Open => &self.on_open,
            State::Closed => &self.on_close,
            State::HalfOpen => &self.on_half_open,
        };
        if let Some(hook) = slot.read().as_ref() {
            hook();
        }
    }

    pub(crate) fn fire_success(&self) {
        if let Some(hook) = self.on_success.read().as_ref() {
            hook();
        }
    }

    pub(crate) fn fire_failure(&self) {
        if let Some(hook) = self.on_failure.read().as_ref() {
            hook();
        }
    }
}
