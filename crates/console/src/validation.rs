//! Pre-submission checks.
//!
//! Every draft must have its required fields filled in. Entity-specific
//! rules plug in through [`DraftCheck`]: customers have their email checked
//! against a snapshot of existing addresses, products have their category
//! checked against the loaded category names.
//!
//! The email snapshot is taken when the form mounts and is never refreshed,
//! so two admins creating the same address at once will both pass. Only a
//! uniqueness constraint on the server can close that gap.

use std::collections::HashSet;

use bazaar_core::{Category, Email, EntityFields, Member, MemberFields, ProductFields};

use crate::error::ValidationError;
use crate::form::FormMode;

/// An extra rule run on submit, after the required-field check.
pub trait DraftCheck<F: EntityFields>: Send + Sync {
    /// Check the draft about to be submitted.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft breaks.
    fn check(&self, draft: &F, mode: &FormMode<F::Id>) -> Result<(), ValidationError>;
}

/// Check that every required field is non-blank.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` naming the first blank field.
pub fn check_required<F: EntityFields>(
    draft: &F,
    mode: &FormMode<F::Id>,
) -> Result<(), ValidationError> {
    F::required(mode.is_create())
        .iter()
        .find(|field| draft.value(**field).trim().is_empty())
        .map_or(Ok(()), |field| {
            Err(ValidationError::MissingField(field.to_string()))
        })
}

/// Run the required-field check, then each extra rule in order.
///
/// # Errors
///
/// Returns the first failure.
pub fn run_gate<F: EntityFields>(
    draft: &F,
    mode: &FormMode<F::Id>,
    checks: &[Box<dyn DraftCheck<F>>],
) -> Result<(), ValidationError> {
    check_required(draft, mode)?;
    checks.iter().try_for_each(|check| check.check(draft, mode))
}

/// Existing customer emails, captured when a customer form mounts.
#[derive(Debug, Clone, Default)]
pub struct EmailSnapshot {
    emails: HashSet<String>,
}

impl EmailSnapshot {
    /// Capture the emails of the given members.
    #[must_use]
    pub fn capture(members: &[Member]) -> Self {
        Self::from_emails(members.iter().map(|m| m.fields.email.as_str()))
    }

    /// Build from raw addresses. Comparison ignores case and surrounding space.
    pub fn from_emails<'a, I>(emails: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Whether the address is already taken.
    #[must_use]
    pub fn contains(&self, email: &Email) -> bool {
        self.emails.contains(&email.normalized())
    }

    /// Number of addresses in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

impl DraftCheck<MemberFields> for EmailSnapshot {
    fn check(
        &self,
        draft: &MemberFields,
        mode: &FormMode<<MemberFields as EntityFields>::Id>,
    ) -> Result<(), ValidationError> {
        let email = Email::parse(&draft.email).map_err(|e| ValidationError::InvalidField {
            field: "email".to_owned(),
            reason: e.to_string(),
        })?;

        // Edits keep their own address, which is in the snapshot.
        if mode.is_create() && self.contains(&email) {
            return Err(ValidationError::DuplicateEmail(email.into_inner()));
        }
        Ok(())
    }
}

/// Category names a product may reference.
#[derive(Debug, Clone, Default)]
pub struct KnownCategories {
    names: Vec<String>,
}

impl KnownCategories {
    /// Capture the names of the loaded categories.
    #[must_use]
    pub fn capture(categories: &[Category]) -> Self {
        Self {
            names: categories.iter().map(|c| c.fields.name.clone()).collect(),
        }
    }

    /// Category names in catalog order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl DraftCheck<ProductFields> for KnownCategories {
    fn check(
        &self,
        draft: &ProductFields,
        _mode: &FormMode<<ProductFields as EntityFields>::Id>,
    ) -> Result<(), ValidationError> {
        if self.names.iter().any(|name| *name == draft.category) {
            Ok(())
        } else {
            Err(ValidationError::UnknownCategory(draft.category.clone()))
        }
    }
}
