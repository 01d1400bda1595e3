//! Ratings the shopper gave during this session.
//!
//! Kept apart from the catalog snapshots on purpose: the catalog's rating is
//! the canonical one, the overlay only changes what is displayed and is gone
//! after a reload.

use std::collections::HashMap;

use storefront_core::{DomainError, DomainResult, ProductId};

use crate::product::{Product, Rating};

#[derive(Debug, Clone, Default)]
pub struct SessionRatings {
    given: HashMap<ProductId, u8>,
}

impl SessionRatings {
    pub const MIN_STARS: u8 = 1;
    pub const MAX_STARS: u8 = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record the shopper's rating for a product. One rating per product.
    pub fn rate(&mut self, id: &ProductId, stars: u8) -> DomainResult<()> {
        if !(Self::MIN_STARS..=Self::MAX_STARS).contains(&stars) {
            return Err(DomainError::validation("stars must be between 1 and 5"));
        }
        if self.given.contains_key(id) {
            return Err(DomainError::conflict(format!("product {id} already rated")));
        }
        self.given.insert(id.clone(), stars);
        tracing::debug!(product_id = %id, stars, "session rating recorded");
        Ok(())
    }

    pub fn user_rating(&self, id: &ProductId) -> Option<u8> {
        self.given.get(id).copied()
    }

    /// The rating to display: the catalog average with the shopper's own
    /// stars folded in as one more vote.
    pub fn effective_rating(&self, product: &Product) -> Option<Rating> {
        let Some(stars) = self.user_rating(&product.id) else {
            return product.rating.clone();
        };

        let (prev_rate, prev_count) = product
            .rating
            .as_ref()
            .map_or((0.0, 0), |r| (r.rate, r.count));
        let count = prev_count.saturating_add(1);
        let rate = (prev_rate * prev_count as f64 + f64::from(stars)) / count as f64;
        let rate = rate.min(Rating::MAX_RATE);

        Some(Rating { rate, count })
    }

    pub fn clear(&mut self) {
        self.given.clear();
    }
}
