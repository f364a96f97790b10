//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different collections.
//!
//! Collection servers assign ids themselves and are not consistent about
//! their shape: some emit integers, others short strings. [`RawId`] keeps
//! whichever form the server sent so the id is echoed back unchanged in
//! request paths and bodies.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Server-assigned identifier in the exact wire form it was received.
///
/// Equality and hashing go through the textual form, so `7` and `"7"`
/// name the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Integer id (`"id": 7`).
    Number(i64),
    /// String id (`"id": "a1f3"`).
    Text(String),
}

impl RawId {
    /// Parse a user-supplied id.
    ///
    /// The integer form is used only when it prints back to the same text,
    /// so `"0042"` or `"+7"` stay strings and address the record they name.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Self::Number(n),
            _ => Self::Text(s.to_owned()),
        }
    }
}

impl PartialEq for RawId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(n), Self::Text(s)) | (Self::Text(s), Self::Number(n)) => {
                *s == n.to_string()
            }
        }
    }
}

impl Eq for RawId {}

impl Hash for RawId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Number(n) => n.to_string().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`RawId`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - `From<i64>`, `From<&str>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(ShelfId);
/// define_id!(AisleId);
///
/// let shelf = ShelfId::from(1);
/// let aisle: AisleId = "a-7".parse().unwrap();
/// assert_eq!(shelf.to_string(), "1");
/// assert_eq!(aisle.to_string(), "a-7");
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = aisle;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($crate::types::id::RawId);

        impl $name {
            /// Wrap a raw server id.
            #[must_use]
            pub const fn new(id: $crate::types::id::RawId) -> Self {
                Self(id)
            }

            /// Get the underlying raw id.
            #[must_use]
            pub const fn raw(&self) -> &$crate::types::id::RawId {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self($crate::types::id::RawId::Number(id))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self($crate::types::id::RawId::parse(id))
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(MemberId);
