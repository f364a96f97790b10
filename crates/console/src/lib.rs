//! Bazaar console library.
//!
//! Client-side state for the storefront and the admin console: REST
//! collection clients, the per-view list, form and notification state, the
//! validation and confirmation gates, and navigation between views.
//!
//! All mutations follow the same path:
//!
//! ```text
//! edit draft ─▶ validate ─▶ confirm (update/delete) ─▶ call server ─▶ patch list ─▶ notify
//! ```
//!
//! A failure at any step stops there, leaves the list untouched and raises
//! a failure notification.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod customers;
pub mod error;
pub mod form;
pub mod list;
pub mod navigation;
pub mod notify;
pub mod resource;
pub mod session;
pub mod storefront;
pub mod validation;

pub use catalog::CatalogConsole;
pub use config::{ConfigError, ConsoleConfig};
pub use confirm::{Action, AlwaysDecline, AutoConfirm, Confirmer, Prompt};
pub use controller::{CrudController, Messages, Outcome, confirm_then_call};
pub use customers::CustomerConsole;
pub use error::{ConsoleError, ResourceError, ValidationError};
pub use form::{FormMode, FormPhase, FormState};
pub use list::ListState;
pub use navigation::{Navigator, View};
pub use notify::{Notification, Notifications, Severity};
pub use resource::{Collection, HttpClient, ResourceClient, http_client};
pub use session::Session;
pub use storefront::{Cart, CartLine, Storefront};
pub use validation::{DraftCheck, EmailSnapshot, KnownCategories};
