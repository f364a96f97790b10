//! Collection records and field-level editing.
//!
//! Every remote collection stores flat JSON objects with a server-assigned
//! `id`. A [`Record`] pairs that id with a typed field set; the field set
//! alone is what gets POSTed when creating, and the full record is what
//! gets PUT when updating.

pub mod category;
pub mod member;
pub mod product;

pub use category::{Category, CategoryField, CategoryFields};
pub use member::{Member, MemberField, MemberFields};
pub use product::{Product, ProductField, ProductFields};

use core::fmt;
use core::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors raised when a typed value cannot be applied to a draft field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The value does not parse for this field.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// No field with this name exists on the record.
    #[error("unknown field: {0}")]
    Unknown(String),
}

/// The editable part of a collection record.
///
/// Implementors describe where their collection lives, how their fields
/// are named, and how raw form input is applied to a single field.
pub trait EntityFields:
    Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Id type assigned by the server.
    type Id: Clone
        + fmt::Debug
        + fmt::Display
        + Eq
        + Hash
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Field selector used by forms.
    type Field: Copy + fmt::Debug + fmt::Display + Eq + Send + Sync + 'static;

    /// Collection path segment (`products`, `categories`, `members`).
    const COLLECTION: &'static str;

    /// Singular noun used in user-facing messages.
    const NOUN: &'static str;

    /// Every field, in display order.
    const FIELDS: &'static [Self::Field];

    /// Fields that must be non-empty on submit.
    ///
    /// `creating` is true for new-record drafts; some fields are only
    /// collected at creation time.
    fn required(creating: bool) -> &'static [Self::Field];

    /// Display value of one field, as a form control would show it.
    fn value(&self, field: Self::Field) -> String;

    /// Apply raw input to exactly one field.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Invalid` if the input does not parse. The draft
    /// is left unchanged in that case.
    fn set(&mut self, field: Self::Field, raw: &str) -> Result<(), FieldError>;

    /// Look up a field by its wire name.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Unknown` if no field has that name.
    fn field(name: &str) -> Result<Self::Field, FieldError> {
        Self::FIELDS
            .iter()
            .copied()
            .find(|f| f.to_string().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| FieldError::Unknown(name.to_owned()))
    }
}

/// A stored record: server id plus its fields, flattened on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Record<F: EntityFields> {
    /// Server-assigned id.
    pub id: F::Id,
    /// Field values.
    #[serde(flatten)]
    pub fields: F,
}

impl<F: EntityFields> Record<F> {
    /// Pair an id with a field set.
    #[must_use]
    pub const fn new(id: F::Id, fields: F) -> Self {
        Self { id, fields }
    }
}

/// Upper-case the first letter of a noun for message text.
#[must_use]
pub fn capitalized(noun: &str) -> String {
    let mut chars = noun.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::CategoryId;

    #[test]
    fn test_record_flattens_fields() {
        let record = Record::new(
            CategoryId::from(4),
            CategoryFields {
                name: "Shoes".to_owned(),
                image: "/img/shoes.png".to_owned(),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 4, "name": "Shoes", "image": "/img/shoes.png"})
        );

        let back: Category = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        assert_eq!(ProductFields::field("Brand").unwrap(), ProductField::Brand);
        assert!(matches!(
            ProductFields::field("colour"),
            Err(FieldError::Unknown(_))
        ));
    }

    #[test]
    fn test_capitalized() {
        assert_eq!(capitalized("customer"), "Customer");
        assert_eq!(capitalized(""), "");
    }
}
