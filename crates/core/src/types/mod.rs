//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod image;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::ImageList;
pub use price::{Price, PriceError};
