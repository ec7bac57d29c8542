//! Transient toast shown at the foot of the panel.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

/// Holds the latest notification until its TTL expires. A newer
/// notification replaces the current one.
#[derive(Debug, Clone)]
pub struct NotificationState {
    current: Option<Notification>,
    ttl: Duration,
    /// Set on errors, cleared by the next user input
    has_unacknowledged_error: bool,
}

impl NotificationState {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            ttl,
            has_unacknowledged_error: false,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn has_unacknowledged_error(&self) -> bool {
        self.has_unacknowledged_error
    }

    pub fn success(&mut self, message: impl ToString, now: Instant) {
        let message = message.to_string();
        tracing::info!("{}", message);
        self.push(NotificationKind::Success, message, now);
    }

    pub fn error(&mut self, message: impl ToString, now: Instant) {
        let message = message.to_string();
        tracing::warn!("{}", message);
        self.has_unacknowledged_error = true;
        self.push(NotificationKind::Error, message, now);
    }

    pub fn info(&mut self, message: impl ToString, now: Instant) {
        let message = message.to_string();
        tracing::debug!("{}", message);
        self.push(NotificationKind::Info, message, now);
    }

    pub fn acknowledge(&mut self) {
        self.has_unacknowledged_error = false;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|n| n.shown_at + self.ttl)
    }

    /// Clear the toast if its TTL elapsed. Returns true if it was cleared.
    pub fn clear_if_expired(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(at) if now >= at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    fn push(&mut self, kind: NotificationKind, message: String, now: Instant) {
        self.current = Some(Notification {
            kind,
            message,
            shown_at: now,
        });
    }
}
