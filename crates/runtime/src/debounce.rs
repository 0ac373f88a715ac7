use std::time::Duration;

use foundation::time::Time;

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline: Time,
    value: T,
}

/// Trailing-edge debouncer.
///
/// Every `schedule` replaces the pending value and restarts the window; the
/// value is released by `poll` only once the window elapsed with no newer
/// `schedule` in between.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule(&mut self, now: Time, value: T) {
        self.pending = Some(Pending {
            deadline: now.saturating_add(self.window),
            value,
        });
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn poll(&mut self, now: Time) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.cancel()
    }
}
