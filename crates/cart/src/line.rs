use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{DomainError, DomainResult, ProductId};

/// One cart entry: the product snapshot taken at add time plus a quantity.
///
/// Stored flattened (`{id, title, price, ..., qty}`) so the persisted shape is
/// the product record with a `qty` field added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub qty: u32,
}

impl CartLine {
    pub fn new(product: Product, qty: u32) -> DomainResult<Self> {
        if qty == 0 {
            return Err(DomainError::validation("cart line quantity must be positive"));
        }
        Ok(Self { product, qty })
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// `price × qty`, unrounded.
    pub fn total(&self) -> f64 {
        self.product.price.times(self.qty)
    }
}
