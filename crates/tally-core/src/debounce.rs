use std::time::{Duration, Instant};

use tracing::debug;

pub const ADD_QUIET_WINDOW: Duration = Duration::from_millis(500);

// Trailing-edge debounce for the add action: each trigger captures the draft
// at call time and restarts the quiet window; the capture fires once the
// window elapses without another trigger.
#[derive(Debug, Default)]
pub struct DebouncedAdd {
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    text: String,
    deadline: Instant,
}

impl DebouncedAdd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&mut self, text: String, now: Instant) {
        let deadline = now + ADD_QUIET_WINDOW;
        debug!(replaced = self.pending.is_some(), "armed debounced add");
        self.pending = Some(Pending { text, deadline });
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn take_if_due(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending.take().map(|pending| pending.text)
            }
            _ => None,
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.pending.take().map(|pending| pending.text)
    }
}
