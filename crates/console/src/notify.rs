//! Single-slot notification surface.
//!
//! At most one message is visible at a time. Raising a new one replaces
//! whatever was showing. Messages expire after a fixed time-to-live, and
//! each carries an id so a stale auto-dismiss timer cannot clear a newer
//! message.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How a notification is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The action went through.
    Success,
    /// The action was not allowed.
    Warning,
    /// The action failed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Identity of this message, for targeted dismissal.
    pub id: Uuid,
    /// Styling.
    pub severity: Severity,
    /// Text shown to the user.
    pub message: String,
    /// When the message was raised.
    pub raised_at: DateTime<Utc>,
}

/// The notification slot of one view.
#[derive(Debug, Clone)]
pub struct Notifications {
    current: Option<Notification>,
    ttl: Duration,
}

impl Notifications {
    /// Default time before a message dismisses itself.
    pub const DEFAULT_TTL: Duration = Duration::from_millis(6000);

    /// Empty slot with the given time-to-live.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    /// Raise a message now, replacing any current one.
    pub fn raise(&mut self, severity: Severity, message: impl Into<String>) -> &Notification {
        self.raise_at(severity, message, Utc::now())
    }

    /// Raise a message with an explicit timestamp.
    pub fn raise_at(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &Notification {
        self.current.insert(Notification {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            raised_at: now,
        })
    }

    /// Shorthand for a success message.
    pub fn success(&mut self, message: impl Into<String>) -> &Notification {
        self.raise(Severity::Success, message)
    }

    /// Shorthand for a warning message.
    pub fn warning(&mut self, message: impl Into<String>) -> &Notification {
        self.raise(Severity::Warning, message)
    }

    /// Shorthand for an error message.
    pub fn error(&mut self, message: impl Into<String>) -> &Notification {
        self.raise(Severity::Error, message)
    }

    /// The message raised last, expired or not.
    #[must_use]
    pub const fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// The message still visible at `now`.
    #[must_use]
    pub fn visible_at(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| !self.is_expired(n, now))
    }

    /// Whether `notification` has outlived the time-to-live at `now`.
    #[must_use]
    pub fn is_expired(&self, notification: &Notification, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(self.ttl)
            .is_ok_and(|ttl| now.signed_duration_since(notification.raised_at) >= ttl)
    }

    /// Clear the slot.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Clear the slot only if it still shows message `id`.
    ///
    /// Returns whether anything was cleared.
    pub fn dismiss_if(&mut self, id: Uuid) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_replaces_old() {
        let mut slot = Notifications::default();
        slot.success("Product added successfully!");
        slot.error("Error processing product. Please try again.");

        let shown = slot.current().unwrap();
        assert_eq!(shown.severity, Severity::Error);
        assert_eq!(shown.message, "Error processing product. Please try again.");
    }

    #[test]
    fn test_expires_after_ttl() {
        let mut slot = Notifications::new(Duration::from_secs(6));
        let start = Utc::now();
        slot.raise_at(Severity::Warning, "careful", start);

        assert!(slot.visible_at(start + chrono::Duration::seconds(5)).is_some());
        assert!(slot.visible_at(start + chrono::Duration::seconds(6)).is_none());
        assert!(slot.current().is_some());
    }

    #[test]
    fn test_stale_dismiss_keeps_newer_message() {
        let mut slot = Notifications::default();
        let first = slot.success("one").id;
        let second = slot.success("two").id;

        assert!(!slot.dismiss_if(first));
        assert_eq!(slot.current().unwrap().message, "two");
        assert!(slot.dismiss_if(second));
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_explicit_dismiss() {
        let mut slot = Notifications::default();
        slot.warning("x");
        slot.dismiss();
        assert!(slot.current().is_none());
    }
}
