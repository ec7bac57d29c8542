//! Hover intent debouncing for pointer enter/leave.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverIntent {
    Enter,
    Leave,
}

/// Holds at most one pending intent. Arming a new intent replaces the
/// previous one, so a leave followed quickly by an enter cancels the leave.
#[derive(Debug, Clone)]
pub struct HoverIntentTracker {
    enter_delay: Duration,
    exit_delay: Duration,
    pending: Option<(HoverIntent, Instant)>,
}

impl HoverIntentTracker {
    pub fn new(enter_delay: Duration, exit_delay: Duration) -> Self {
        Self {
            enter_delay,
            exit_delay,
            pending: None,
        }
    }

    pub fn arm_enter(&mut self, now: Instant) {
        self.pending = Some((HoverIntent::Enter, now + self.enter_delay));
    }

    pub fn arm_leave(&mut self, now: Instant) {
        self.pending = Some((HoverIntent::Leave, now + self.exit_delay));
    }

    pub fn disarm(&mut self) {
        self.pending = None;
    }

    /// Cancel a pending leave without touching a pending enter.
    pub fn cancel_leave(&mut self) {
        if matches!(self.pending, Some((HoverIntent::Leave, _))) {
            self.pending = None;
        }
    }

    pub fn pending(&self) -> Option<HoverIntent> {
        self.pending.map(|(intent, _)| intent)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Take the pending intent once its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<HoverIntent> {
        match self.pending {
            Some((intent, at)) if now >= at => {
                self.pending = None;
                Some(intent)
            }
            _ => None,
        }
    }
}
