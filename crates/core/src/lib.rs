//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `console` - Storefront landing view and admin console over the REST collections
//! - `cli` - Terminal front end for the console
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and image lists
//! - [`entity`] - Collection records (products, categories, members) and field editing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entity;
pub mod types;

pub use entity::*;
pub use types::*;
