//! Product image URLs.

use serde::{Deserialize, Deserializer, Serialize};

/// Ordered list of image URLs.
///
/// Upstream product records are inconsistent: `image` is sometimes a single
/// URL string and sometimes an array of URLs. Both shapes (and `null`)
/// deserialize into this one canonical list, so nothing downstream has to
/// care. Serialization always writes an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageShape {
    One(String),
    Many(Vec<String>),
}

impl ImageList {
    /// Build a list, dropping blank entries.
    #[must_use]
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            urls.into_iter()
                .map(Into::into)
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty())
                .collect(),
        )
    }

    /// Parse a `", "`-separated list as typed into a form field.
    ///
    /// A bare comma is part of the URL (`/upload/w_100,h_100/a.jpg`), so
    /// only comma plus space separates entries. This is the inverse of
    /// `Display`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self::new(s.split(", "))
    }

    /// The card image: first URL, if any.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// All URLs in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ImageList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<ImageShape>::deserialize(deserializer)? {
            Some(ImageShape::One(url)) => Self::new([url]),
            Some(ImageShape::Many(urls)) => Self::new(urls),
            None => Self::default(),
        })
    }
}

impl std::fmt::Display for ImageList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
