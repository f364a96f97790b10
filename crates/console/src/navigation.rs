//! View navigation.
//!
//! A transition may carry a customer record to the destination. Views that
//! need that record (the customer edit form) cannot be entered without it;
//! they redirect to their parent listing instead.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use bazaar_core::{Member, MemberId};

/// Views remembered for [`Navigator::back`]; the oldest is dropped first.
const HISTORY_LIMIT: usize = 32;

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Storefront landing page.
    Home,
    /// Product management.
    Products,
    /// Category management.
    Categories,
    /// Customer listing.
    Customers,
    /// New customer form.
    CustomerCreate,
    /// Edit form for one customer; needs the record as carried state.
    CustomerEdit(MemberId),
    /// Read-only customer details.
    CustomerShow(MemberId),
}

impl View {
    /// Route path of the view.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Products => "/AdminProducts".to_owned(),
            Self::Categories => "/AdminCategories".to_owned(),
            Self::Customers => "/CustomerManagement".to_owned(),
            Self::CustomerCreate => "/CustomerAdd".to_owned(),
            Self::CustomerEdit(id) => format!("/CustomerEdit/{id}"),
            Self::CustomerShow(id) => format!("/customer-show/{id}"),
        }
    }

    /// The listing a detail view falls back to.
    #[must_use]
    pub const fn parent(&self) -> Option<Self> {
        match self {
            Self::CustomerCreate | Self::CustomerEdit(_) | Self::CustomerShow(_) => {
                Some(Self::Customers)
            }
            Self::Home | Self::Products | Self::Categories | Self::Customers => None,
        }
    }

    fn accepts(&self, carried: Option<&Member>) -> bool {
        match self {
            Self::CustomerEdit(id) => carried.is_some_and(|m| &m.id == id),
            _ => true,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone)]
struct PendingRedirect {
    to: View,
    after: Duration,
}

/// Current view, carried state and history.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: View,
    carried: Option<Member>,
    history: VecDeque<View>,
    pending: Option<PendingRedirect>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(View::Home)
    }
}

impl Navigator {
    /// Start on `view`.
    #[must_use]
    pub const fn new(view: View) -> Self {
        Self {
            current: view,
            carried: None,
            history: VecDeque::new(),
            pending: None,
        }
    }

    /// Go to `view` without carried state.
    pub fn go(&mut self, view: View) -> &View {
        self.enter(view, None)
    }

    /// Go to `view` carrying `member`.
    pub fn go_with(&mut self, view: View, member: Member) -> &View {
        self.enter(view, Some(member))
    }

    fn enter(&mut self, view: View, carried: Option<Member>) -> &View {
        self.pending = None;
        let previous = std::mem::replace(&mut self.current, View::Home);
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(previous);

        if view.accepts(carried.as_ref()) {
            self.current = view;
            self.carried = carried;
        } else {
            let fallback = view.parent().unwrap_or(View::Home);
            tracing::debug!(requested = %view, redirected = %fallback, "Missing navigation state");
            self.current = fallback;
            self.carried = None;
        }
        &self.current
    }

    /// Return to the previous view. Stays put when there is no history.
    pub fn back(&mut self) -> &View {
        if let Some(previous) = self.history.pop_back() {
            self.current = previous;
            self.carried = None;
            self.pending = None;
        }
        &self.current
    }

    /// Arrange a redirect to `view` once `after` has elapsed.
    pub fn redirect_after(&mut self, view: View, after: Duration) {
        self.pending = Some(PendingRedirect { to: view, after });
    }

    /// Destination of the pending redirect, if any.
    #[must_use]
    pub fn pending_redirect(&self) -> Option<&View> {
        self.pending.as_ref().map(|p| &p.to)
    }

    /// Wait out the pending redirect and follow it.
    ///
    /// Returns the view landed on, or `None` if nothing was pending.
    pub async fn settle(&mut self) -> Option<&View> {
        let PendingRedirect { to, after } = self.pending.take()?;
        tokio::time::sleep(after).await;
        Some(self.go(to))
    }

    /// Current view.
    #[must_use]
    pub const fn current(&self) -> &View {
        &self.current
    }

    /// Record carried into the current view.
    #[must_use]
    pub const fn carried(&self) -> Option<&Member> {
        self.carried.as_ref()
    }
}
