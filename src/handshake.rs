//! Blocking RPC over the asynchronous event channel.
//!
//! A [`Completion`] is the promise half of a synchronous cross-thread call:
//! the requester posts an event carrying a clone of the completion, then
//! blocks on [`Completion::wait`] until the render thread resolves it with
//! [`Completion::complete`]. The slot resolves exactly once; later
//! completions are ignored.

use std::sync::{Arc, Condvar, Mutex};

/// A resolve-once status slot shared between a requester and the render
/// thread.
#[derive(Debug)]
pub struct Completion<T> {
    inner: Arc<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    value: Mutex<Option<T>>,
    resolved: Condvar,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Completion<T> {
    /// Create an unresolved completion.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Slot {
                value: Mutex::new(None),
                resolved: Condvar::new(),
            }),
        }
    }

    /// Resolve the completion, waking all waiters.
    ///
    /// Only the first call has any effect.
    pub fn complete(&self, value: T) {
        let mut slot = self.inner.value.lock().unwrap();
        if slot.is_none() {
            *slot = Some(value);
            self.inner.resolved.notify_all();
        }
    }

    /// Whether the completion has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.inner.value.lock().unwrap().is_some()
    }
}

impl<T: Clone> Completion<T> {
    /// Block until the completion is resolved and return the value.
    pub fn wait(&self) -> T {
        let mut slot = self.inner.value.lock().unwrap();
        loop {
            if let Some(value) = slot.as_ref() {
                return value.clone();
            }
            slot = self.inner.resolved.wait(slot).unwrap();
        }
    }
}
