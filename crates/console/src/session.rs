//! Login context.
//!
//! The session is passed explicitly to whatever needs to know who is
//! logged in. Nothing about it is stored globally.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoggedIn {
    username: String,
    since: DateTime<Utc>,
}

/// Who, if anyone, is logged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<LoggedIn>,
}

impl Session {
    /// A logged-out session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// Log `username` in, replacing any previous login.
    pub fn start(&mut self, username: impl Into<String>) {
        let username = username.into();
        tracing::info!(username = %username, "Session started");
        self.user = Some(LoggedIn {
            username,
            since: Utc::now(),
        });
    }

    /// Log out.
    pub fn end(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(username = %user.username, "Session ended");
        }
    }

    /// Whether someone is logged in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// The logged-in username.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// When the current login started.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.user.as_ref().map(|u| u.since)
    }
}
