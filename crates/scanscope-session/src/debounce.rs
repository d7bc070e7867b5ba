/// Cancellable trailing-edge timer.
///
/// The controller polls it once per tick rather than owning a timer thread.
/// Scheduling always replaces the pending deadline, so a burst of triggers
/// collapses into one firing `delay` after the last of them.
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    detail: Option<String>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            detail: None,
        }
    }

    /// (Re)arm the timer. `detail` replaces whatever the earlier trigger carried.
    pub fn schedule(&mut self, now: Instant, detail: impl Into<String>) {
        self.deadline = Some(now + self.delay);
        self.detail = Some(detail.into());
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.detail = None;
    }

    /// Fire if the deadline has passed, returning the latest trigger's detail.
    pub fn fire(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.detail.take().unwrap_or_default())
            }
            _ => None,
        }
    }
}
