//! Member email addresses, as checked on submit.

/// Why a typed address was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs text on both sides of the @")]
    MissingPart,
}

/// A member email address that passed the submit-time shape check.
///
/// Member drafts keep the raw text the admin typed. The submit gate parses it
/// into this type, then compares [`Email::normalized`] against the snapshot
/// of addresses already on file.
///
/// ```
/// use bazaar_core::Email;
///
/// let typed = Email::parse("  Ada@Example.com ").unwrap();
/// assert_eq!(typed.as_str(), "Ada@Example.com");
/// assert_eq!(typed.normalized(), "ada@example.com");
///
/// assert!(Email::parse("ada.example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Trim and check an address typed into the member form.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] when the trimmed text is empty, too long,
    /// has other than one `@`, or has nothing on either side of it.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        let mut parts = s.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::AtSymbol);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Lowercased form the uniqueness snapshot is keyed on.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}
