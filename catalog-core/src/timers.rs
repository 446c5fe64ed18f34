//! Delayed actions owned by a screen.
//!
//! Each slot holds at most one pending task; rescheduling a slot aborts the
//! previous task and dropping the owner aborts everything still pending.

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Auto-clear of the global error banner.
    ClearError,
    /// Redirect after success or a fatal load error.
    Navigate,
}

#[derive(Debug, Default)]
pub struct DelayedActions {
    pending: HashMap<TimerSlot, JoinHandle<()>>,
}

impl DelayedActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` after `delay` unless cancelled first. Needs a tokio runtime.
    pub fn schedule<F>(&mut self, slot: TimerSlot, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel(slot);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        self.pending.insert(slot, handle);
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        if let Some(handle) = self.pending.remove(&slot) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }

    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.pending.get(&slot).is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DelayedActions {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
