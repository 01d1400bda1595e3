use serde::{Deserialize, Deserializer, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, Price, ProductId, ValueObject};

/// Aggregate rating published by the catalog.
///
/// Deserialization goes through [`Rating::new`], so an out-of-range rate is
/// rejected wherever a rating is decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    /// Average rate in `[0, 5]`.
    pub rate: f64,
    pub count: u64,
}

impl Rating {
    pub const MAX_RATE: f64 = 5.0;

    pub fn new(rate: f64, count: u64) -> DomainResult<Self> {
        if !rate.is_finite() || !(0.0..=Self::MAX_RATE).contains(&rate) {
            return Err(DomainError::validation("rating rate must be within [0, 5]"));
        }
        Ok(Self { rate, count })
    }
}

impl ValueObject for Rating {}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawRating {
            rate: f64,
            #[serde(default)]
            count: u64,
        }

        let raw = RawRating::deserialize(deserializer)?;
        Rating::new(raw.rate, raw.count).map_err(serde::de::Error::custom)
    }
}

/// Immutable snapshot of a sellable product as the catalog described it.
///
/// Cart lines embed a copy taken at add-to-cart time, so later catalog
/// changes never leak into an existing cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Product {
    pub fn new(id: ProductId, title: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: String::new(),
            description: String::new(),
            category: None,
            rating: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_range_is_rejected() {
        assert!(Rating::new(5.1, 3).is_err());
        assert!(Rating::new(-1.0, 3).is_err());
        assert!(Rating::new(f64::NAN, 0).is_err());
        assert!(Rating::new(4.5, 120).is_ok());
    }

    #[test]
    fn decoding_enforces_rating_range() {
        let ok: Rating = serde_json::from_str(r#"{"rate":3.9,"count":120}"#).unwrap();
        assert_eq!(ok, Rating { rate: 3.9, count: 120 });

        assert!(serde_json::from_str::<Rating>(r#"{"rate":42.0,"count":1}"#).is_err());
        assert!(
            serde_json::from_str::<Product>(
                r#"{"id":"1","title":"Mug","price":4.5,"rating":{"rate":-2,"count":1}}"#
            )
            .is_err()
        );
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let product: Product =
            serde_json::from_str(r#"{"id":"1","title":"Mug","price":4.5}"#).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.image, "");
        assert!(product.category.is_none());
        assert!(product.rating.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let product: Product = serde_json::from_str(
            r#"{"id":"1","title":"Mug","price":4.5,"colour":"blue","stock":3}"#,
        )
        .unwrap();
        assert_eq!(product.title, "Mug");
    }
}
