//! Confirmation gate for destructive or overwriting actions.

use std::fmt;

/// The kind of action being confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Replace a stored record.
    Update,
    /// Delete a stored record.
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A yes/no question put to the user before an action runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// The action awaiting approval.
    pub action: Action,
    /// Singular noun of the affected record.
    pub noun: &'static str,
}

impl Prompt {
    /// Prompt for `action` on a record described by `noun`.
    #[must_use]
    pub const fn new(action: Action, noun: &'static str) -> Self {
        Self { action, noun }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Are you sure you want to {} this {}?", self.action, self.noun)
    }
}

/// Something that can answer a [`Prompt`].
pub trait Confirmer {
    /// Ask the question; `true` means go ahead.
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

/// Approves every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, _prompt: &Prompt) -> bool {
        true
    }
}

/// Declines every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecline;

impl Confirmer for AlwaysDecline {
    fn confirm(&mut self, _prompt: &Prompt) -> bool {
        false
    }
}

impl<T> Confirmer for T
where
    T: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text() {
        assert_eq!(
            Prompt::new(Action::Update, "customer").to_string(),
            "Are you sure you want to update this customer?"
        );
        assert_eq!(
            Prompt::new(Action::Delete, "product").to_string(),
            "Are you sure you want to delete this product?"
        );
    }

    #[test]
    fn test_closure_confirmer_sees_prompt() {
        let mut seen = Vec::new();
        let mut confirmer = |p: &Prompt| {
            seen.push(p.action);
            p.action == Action::Update
        };
        assert!(confirmer.confirm(&Prompt::new(Action::Update, "category")));
        assert!(!confirmer.confirm(&Prompt::new(Action::Delete, "category")));
        assert_eq!(seen, [Action::Update, Action::Delete]);
    }

    #[test]
    fn test_fixed_confirmers() {
        let prompt = Prompt::new(Action::Delete, "product");
        assert!(AutoConfirm.confirm(&prompt));
        assert!(!AlwaysDecline.confirm(&prompt));
    }
}
