use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Collapses bursts of calls into one trailing call of `action`.
///
/// Each `call` cancels the pending timer and starts a new one, so of N calls
/// spaced closer than `delay` only the last runs, once, `delay` after it.
/// The action takes no arguments: it reads whatever live state it needs when
/// it fires. Timers run on the current `LocalSet`.
pub struct Debouncer {
    action: Rc<dyn Fn()>,
    delay: Duration,
    pending: RefCell<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn wrap(action: impl Fn() + 'static, delay: Duration) -> Self {
        Self {
            action: Rc::new(action),
            delay,
            pending: RefCell::new(None),
        }
    }

    /// Restarts the timer.
    ///
    /// # Panics
    ///
    /// Panics outside a `tokio::task::LocalSet`.
    pub fn call(&self) {
        self.cancel();
        let action = Rc::clone(&self.action);
        // The deadline counts from this call, not from the task's first poll.
        let timer = tokio::time::sleep(self.delay);
        let handle = tokio::task::spawn_local(async move {
            timer.await;
            action();
        });
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Drops the pending call, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
