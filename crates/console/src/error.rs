//! Unified error handling for the console.
//!
//! Three kinds of failure reach the UI boundary: transport failures,
//! non-success HTTP statuses (both [`ResourceError`]) and client-side
//! validation failures ([`ValidationError`]). They are all reported the
//! same way: the operation is abandoned, state is left as it was, and
//! [`ConsoleError::user_message`] becomes the failure notification.

use bazaar_core::FieldError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors from a REST collection call.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The record does not exist on the server.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not decode into the expected record shape.
    #[error("Parse error: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Pre-submission check failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(String),

    /// A field holds a value that does not parse.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// The email is already used by another customer.
    #[error("Email already exists. Please use a different email.")]
    DuplicateEmail(String),

    /// The product names a category that is not in the catalog.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Application-level error type for the console.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Collection call failed.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Draft failed the validation gate.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Raw input could not be applied to a draft field.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A submission for this form is already in flight.
    #[error("A submission is already in progress")]
    SubmitInFlight,

    /// No form is open.
    #[error("No form is open")]
    NoForm,

    /// The record is not in the local list.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The action needs a logged-in session.
    #[error("Login required")]
    LoginRequired,
}

impl ConsoleError {
    /// Human-readable text for the failure notification.
    ///
    /// Validation problems are shown as-is; server and transport problems
    /// collapse into the generic `failure` text so internal details are not
    /// shown to the user.
    #[must_use]
    pub fn user_message(&self, failure: &str) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Field(e) => e.to_string(),
            Self::SubmitInFlight => "Please wait for the current request to finish.".to_owned(),
            Self::LoginRequired => {
                "You must be logged in to add products to the cart. Please log in or register."
                    .to_owned()
            }
            Self::Resource(_) | Self::Config(_) | Self::NoForm | Self::NotFound(_) => {
                failure.to_owned()
            }
        }
    }
}
