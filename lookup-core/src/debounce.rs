use std::{
    future::Future,
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tokio::{runtime::Handle, task::JoinHandle};

/// Single-slot debounce timer.
///
/// Scheduling replaces (and aborts) whatever was still waiting. Once the quiet
/// period has elapsed the action runs on its own task, so a later `schedule` or
/// `cancel` never interrupts an action that already started.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration, runtime: Handle) -> Self {
        Self { delay, runtime, pending: Mutex::new(None) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `action` after the quiet period unless rescheduled or cancelled first.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        });

        let previous = self.slot().replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop the pending action, if any. Returns `true` if one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|timer| !timer.is_finished())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
