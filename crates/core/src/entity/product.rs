//! Catalog products.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{EntityFields, FieldError, Record};
use crate::types::{ImageList, Price, ProductId};

/// A product as stored in the `products` collection.
pub type Product = Record<ProductFields>;

/// Editable product fields.
///
/// `price` is empty in a fresh draft and required before submit. `category`
/// holds a category *name*, not an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: ImageList,
}

/// Older records were saved straight from an untouched form and carry
/// `"price": ""`; read those as "no price" instead of failing the listing.
fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Price>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => Price::deserialize(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Product field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Name,
    Price,
    Category,
    Brand,
    Description,
    Image,
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Description => "description",
            Self::Image => "image",
        })
    }
}

impl EntityFields for ProductFields {
    type Id = ProductId;
    type Field = ProductField;

    const COLLECTION: &'static str = "products";
    const NOUN: &'static str = "product";
    const FIELDS: &'static [ProductField] = &[
        ProductField::Name,
        ProductField::Price,
        ProductField::Category,
        ProductField::Brand,
        ProductField::Description,
        ProductField::Image,
    ];

    fn required(creating: bool) -> &'static [ProductField] {
        if creating {
            &[
                ProductField::Name,
                ProductField::Price,
                ProductField::Brand,
                ProductField::Description,
                ProductField::Category,
                ProductField::Image,
            ]
        } else {
            &[
                ProductField::Name,
                ProductField::Price,
                ProductField::Brand,
                ProductField::Description,
                ProductField::Category,
            ]
        }
    }

    fn value(&self, field: ProductField) -> String {
        match field {
            ProductField::Name => self.name.clone(),
            ProductField::Price => self.price.map(|p| p.to_string()).unwrap_or_default(),
            ProductField::Category => self.category.clone(),
            ProductField::Brand => self.brand.clone(),
            ProductField::Description => self.description.clone(),
            ProductField::Image => self.image.to_string(),
        }
    }

    fn set(&mut self, field: ProductField, raw: &str) -> Result<(), FieldError> {
        match field {
            ProductField::Name => raw.clone_into(&mut self.name),
            ProductField::Price => {
                self.price = if raw.trim().is_empty() {
                    None
                } else {
                    Some(Price::parse(raw).map_err(|e| FieldError::Invalid {
                        field: "price",
                        reason: e.to_string(),
                    })?)
                };
            }
            ProductField::Category => raw.clone_into(&mut self.category),
            ProductField::Brand => raw.clone_into(&mut self.brand),
            ProductField::Description => raw.clone_into(&mut self.description),
            ProductField::Image => self.image = ImageList::parse(raw),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_scalar_image_and_string_price() {
        let product: Product = serde_json::from_str(
            r#"{"id":"9","name":"Lamp","price":"30","category":"Home",
                "brand":"Lumo","description":"Desk lamp","image":"/img/lamp.jpg"}"#,
        )
        .unwrap();
        assert_eq!(product.id, ProductId::from(9));
        assert_eq!(product.fields.price, Some(Price::from_cents(3000).unwrap()));
        assert_eq!(product.fields.image.primary(), Some("/img/lamp.jpg"));
    }

    #[test]
    fn test_blank_price_on_the_wire_is_none() {
        let product: Product =
            serde_json::from_str(r#"{"id":1,"name":"Mug","price":"","image":[]}"#).unwrap();
        assert_eq!(product.fields.price, None);
        assert_eq!(product.fields.category, "");
    }

    #[test]
    fn test_set_touches_only_one_field() {
        let mut draft = ProductFields {
            name: "Lamp".to_owned(),
            brand: "Lumo".to_owned(),
            ..ProductFields::default()
        };
        draft.set(ProductField::Name, "Floor lamp").unwrap();
        assert_eq!(draft.name, "Floor lamp");
        assert_eq!(draft.brand, "Lumo");
    }

    #[test]
    fn test_bad_price_leaves_draft_untouched() {
        let mut draft = ProductFields::default();
        draft.set(ProductField::Price, "12").unwrap();
        let err = draft.set(ProductField::Price, "twelve").unwrap_err();
        assert!(matches!(err, FieldError::Invalid { field: "price", .. }));
        assert_eq!(draft.value(ProductField::Price), "12.00");
    }

    #[test]
    fn test_blank_price_clears_value() {
        let mut draft = ProductFields::default();
        draft.set(ProductField::Price, "5").unwrap();
        draft.set(ProductField::Price, "  ").unwrap();
        assert_eq!(draft.price, None);
    }

    #[test]
    fn test_image_field_is_comma_separated() {
        let mut draft = ProductFields::default();
        draft.set(ProductField::Image, "/a.jpg, /b.jpg").unwrap();
        assert_eq!(draft.image.len(), 2);
        assert_eq!(draft.value(ProductField::Image), "/a.jpg, /b.jpg");
    }

    #[test]
    fn test_images_required_only_when_creating() {
        let create = ProductFields::required(true);
        let edit = ProductFields::required(false);
        assert!(create.contains(&ProductField::Brand));
        assert!(create.contains(&ProductField::Description));
        assert!(create.contains(&ProductField::Image));
        assert!(edit.contains(&ProductField::Description));
        assert!(!edit.contains(&ProductField::Image));
    }
}
