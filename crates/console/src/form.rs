//! Form state machine.
//!
//! ```text
//! Closed ──open──▶ Open ──edit──▶ Editing ──submit──▶ Submitting ──ok──▶ Closed
//!                    │                ▲                   │
//!                    └────submit──────┼───────────────────┘ (validation or
//!                                     └──────── fail ───────  server failure)
//! ```
//!
//! The draft is always an owned copy. Opening an edit form clones the
//! selected record's fields, so nothing typed into the form reaches the
//! listed record until the server has accepted it.

use bazaar_core::{EntityFields, Record};

use crate::error::ConsoleError;

/// Whether the form creates a record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode<Id> {
    /// New record; the server will assign the id.
    Create,
    /// Existing record with this id.
    Edit(Id),
}

impl<Id> FormMode<Id> {
    /// True for new-record forms.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

/// Lifecycle phase of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// No form shown.
    Closed,
    /// Form shown with its initial draft, untouched.
    Open,
    /// At least one field has been edited, or a submit came back.
    Editing,
    /// A mutation request is in flight; submit is disabled.
    Submitting,
}

/// A draft record bound to a form.
#[derive(Debug, Clone)]
pub struct FormState<F: EntityFields> {
    phase: FormPhase,
    mode: FormMode<F::Id>,
    draft: F,
}

impl<F: EntityFields> Default for FormState<F> {
    fn default() -> Self {
        Self {
            phase: FormPhase::Closed,
            mode: FormMode::Create,
            draft: F::default(),
        }
    }
}

impl<F: EntityFields> FormState<F> {
    /// A closed form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a create form with empty defaults.
    pub fn open_create(&mut self) {
        self.mode = FormMode::Create;
        self.draft = F::default();
        self.phase = FormPhase::Open;
    }

    /// Open an edit form on a copy of `record`.
    pub fn open_edit(&mut self, record: &Record<F>) {
        self.mode = FormMode::Edit(record.id.clone());
        self.draft = record.fields.clone();
        self.phase = FormPhase::Open;
    }

    /// Close the form and discard the draft.
    pub fn close(&mut self) {
        self.phase = FormPhase::Closed;
        self.mode = FormMode::Create;
        self.draft = F::default();
    }

    /// Apply raw input to one draft field.
    ///
    /// # Errors
    ///
    /// - `ConsoleError::NoForm` if the form is closed.
    /// - `ConsoleError::SubmitInFlight` while a submission is pending.
    /// - `ConsoleError::Field` if the value does not parse; the draft is unchanged.
    pub fn set_field(&mut self, field: F::Field, raw: &str) -> Result<(), ConsoleError> {
        match self.phase {
            FormPhase::Closed => Err(ConsoleError::NoForm),
            FormPhase::Submitting => Err(ConsoleError::SubmitInFlight),
            FormPhase::Open | FormPhase::Editing => {
                self.draft.set(field, raw)?;
                self.phase = FormPhase::Editing;
                Ok(())
            }
        }
    }

    /// Check that a submit may start now.
    ///
    /// # Errors
    ///
    /// `ConsoleError::NoForm` if closed, `ConsoleError::SubmitInFlight` if a
    /// request is already pending.
    pub const fn ensure_submittable(&self) -> Result<(), ConsoleError> {
        match self.phase {
            FormPhase::Closed => Err(ConsoleError::NoForm),
            FormPhase::Submitting => Err(ConsoleError::SubmitInFlight),
            FormPhase::Open | FormPhase::Editing => Ok(()),
        }
    }

    /// Enter `Submitting`, disabling further submits and edits.
    ///
    /// # Errors
    ///
    /// Same as [`ensure_submittable`](Self::ensure_submittable).
    pub fn begin_submit(&mut self) -> Result<(), ConsoleError> {
        self.ensure_submittable()?;
        self.phase = FormPhase::Submitting;
        Ok(())
    }

    /// Return to `Editing` after a rejected submit, keeping the draft.
    pub fn reopen(&mut self) {
        if self.phase != FormPhase::Closed {
            self.phase = FormPhase::Editing;
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &FormMode<F::Id> {
        &self.mode
    }

    /// Current draft.
    #[must_use]
    pub const fn draft(&self) -> &F {
        &self.draft
    }

    /// Whether the form is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.phase != FormPhase::Closed
    }

    /// Whether the submit control should be enabled.
    #[must_use]
    pub const fn is_submit_enabled(&self) -> bool {
        matches!(self.phase, FormPhase::Open | FormPhase::Editing)
    }
}
