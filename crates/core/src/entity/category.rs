//! Catalog categories.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{EntityFields, FieldError, Record};
use crate::types::CategoryId;

/// A category as stored in the `categories` collection.
pub type Category = Record<CategoryFields>;

/// Editable category fields. `image` is a single URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// Category field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    Name,
    Image,
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Image => "image",
        })
    }
}

impl EntityFields for CategoryFields {
    type Id = CategoryId;
    type Field = CategoryField;

    const COLLECTION: &'static str = "categories";
    const NOUN: &'static str = "category";
    const FIELDS: &'static [CategoryField] = &[CategoryField::Name, CategoryField::Image];

    fn required(_creating: bool) -> &'static [CategoryField] {
        &[CategoryField::Name, CategoryField::Image]
    }

    fn value(&self, field: CategoryField) -> String {
        match field {
            CategoryField::Name => self.name.clone(),
            CategoryField::Image => self.image.clone(),
        }
    }

    fn set(&mut self, field: CategoryField, raw: &str) -> Result<(), FieldError> {
        match field {
            CategoryField::Name => raw.clone_into(&mut self.name),
            CategoryField::Image => raw.trim().clone_into(&mut self.image),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_image_required() {
        assert_eq!(
            CategoryFields::required(true),
            [CategoryField::Name, CategoryField::Image]
        );
        let mut draft = CategoryFields::default();
        draft.set(CategoryField::Image, "  /img/bags.jpg ").unwrap();
        assert_eq!(draft.value(CategoryField::Image), "/img/bags.jpg");
    }
}
