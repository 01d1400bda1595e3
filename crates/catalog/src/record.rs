//! Lenient mapping from raw catalog records to product snapshots.
//!
//! Catalog APIs are loose about types (numeric ids, prices sent as strings,
//! missing descriptions). Records are normalised here before they reach the
//! cache.

use serde::Deserialize;
use storefront_core::{DomainError, DomainResult, Price, ProductId};

use crate::product::{Product, Rating};

/// A number or a string, as catalog APIs tend to send ids and prices.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One product as the remote catalog returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub id: Scalar,
    pub title: String,
    pub price: Scalar,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Kept raw so a malformed rating costs the rating, not the product.
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
}

impl ProductRecord {
    pub fn into_product(self) -> DomainResult<Product> {
        let id = ProductId::new(self.id.as_text())?;
        let amount = self
            .price
            .as_f64()
            .ok_or_else(|| DomainError::validation(format!("product {id}: price is not numeric")))?;
        let price = Price::new(amount)?;
        let rating = self.rating.and_then(|raw| lenient_rating(&id, raw));

        Ok(Product {
            id,
            title: self.title,
            price,
            image: self.image.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self.category.filter(|c| !c.trim().is_empty()),
            rating,
        })
    }
}

fn lenient_rating(id: &ProductId, raw: serde_json::Value) -> Option<Rating> {
    match serde_json::from_value::<Rating>(raw) {
        Ok(rating) => Some(rating),
        Err(err) => {
            tracing::warn!(product_id = %id, error = %err, "dropping invalid catalog rating");
            None
        }
    }
}

/// Map a batch of records, dropping (and logging) the ones that cannot be
/// turned into a valid snapshot.
pub fn products_from_records(records: Vec<ProductRecord>) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|record| match record.into_product() {
            Ok(product) => Some(product),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed catalog record");
                None
            }
        })
        .collect()
}

/// Decode a raw JSON batch record by record, so one bad element (missing
/// title, wrong field type) is dropped instead of failing the whole batch.
pub fn products_from_values(values: Vec<serde_json::Value>) -> Vec<Product> {
    let records = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<ProductRecord>(value) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping undecodable catalog record");
                None
            }
        })
        .collect();

    products_from_records(records)
}
