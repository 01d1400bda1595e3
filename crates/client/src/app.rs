//! Composition root for a storefront front end.

use storefront_cart::{CartPersistence, CartStore, CheckoutReceipt};
use storefront_catalog::{CatalogCache, CatalogSource, LoadOutcome, Product, Rating, SessionRatings};
use storefront_core::{DomainError, DomainResult, ProductId};
use storefront_storage::StateSlot;

/// One shopper's session: catalog, cart and session-only ratings.
///
/// The cart is hydrated from its slot on construction; the catalog starts
/// empty until [`Storefront::load_catalog`] runs.
#[derive(Debug)]
pub struct Storefront<C, S> {
    catalog: CatalogCache<C>,
    cart: CartStore<S>,
    ratings: SessionRatings,
}

impl<C, S> Storefront<C, S>
where
    C: CatalogSource,
    S: StateSlot,
{
    pub fn new(source: C, persistence: CartPersistence<S>) -> Self {
        let cart = CartStore::hydrate(persistence);
        tracing::info!(
            lines = cart.cart().len(),
            total_items = cart.total_items(),
            "storefront session started"
        );

        Self {
            catalog: CatalogCache::new(source),
            cart,
            ratings: SessionRatings::new(),
        }
    }

    pub async fn load_catalog(&self) -> LoadOutcome {
        self.catalog.load().await
    }

    /// Add `qty` of a cached catalog product to the cart.
    ///
    /// The cart stores the catalog's current snapshot of the product.
    pub fn add_product(&mut self, id: &ProductId, qty: i64) -> DomainResult<()> {
        let product = self.catalog.find(id).ok_or(DomainError::NotFound)?;
        self.cart.add_to_cart(&product, qty);
        Ok(())
    }

    pub fn checkout(&mut self) -> Option<CheckoutReceipt> {
        self.cart.checkout()
    }
}

impl<C, S> Storefront<C, S> {
    pub fn catalog(&self) -> &CatalogCache<C> {
        &self.catalog
    }

    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    /// Number shown on the cart badge.
    pub fn cart_badge(&self) -> u64 {
        self.cart.total_items()
    }

    /// Rate a product for this session only (1..=5, once per product).
    pub fn rate(&mut self, id: &ProductId, stars: u8) -> DomainResult<()> {
        self.ratings.rate(id, stars)
    }

    /// Catalog rating with this session's vote folded in.
    pub fn rating_of(&self, product: &Product) -> Option<Rating> {
        self.ratings.effective_rating(product)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront_catalog::{CatalogError, InMemoryCatalogSource};
    use storefront_core::Price;
    use storefront_storage::InMemorySlot;

    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(ProductId::from(1), "Red Shirt", Price::new(20.0).unwrap())
                .with_category("clothing")
                .with_rating(Rating::new(4.0, 10).unwrap()),
            Product::new(ProductId::from(2), "Blue Shirt", Price::new(10.0).unwrap())
                .with_category("clothing"),
            Product::new(ProductId::from(3), "Hat", Price::new(5.0).unwrap()).with_category("accessories"),
        ]
    }

    fn storefront(
        slot: Arc<InMemorySlot>,
    ) -> Storefront<Arc<InMemoryCatalogSource>, Arc<InMemorySlot>> {
        let source = Arc::new(InMemoryCatalogSource::new(catalog()));
        Storefront::new(source, CartPersistence::new(slot))
    }

    #[tokio::test]
    async fn add_product_uses_catalog_snapshot() {
        let mut shop = storefront(Arc::new(InMemorySlot::new()));
        shop.load_catalog().await;

        shop.add_product(&ProductId::from(2), 3).unwrap();

        let line = shop.cart().line(&ProductId::from(2)).unwrap();
        assert_eq!(line.product.title, "Blue Shirt");
        assert_eq!(shop.cart_badge(), 3);
        assert_eq!(shop.cart().total_price(), 30.0);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let mut shop = storefront(Arc::new(InMemorySlot::new()));
        shop.load_catalog().await;

        let err = shop.add_product(&ProductId::from(99), 1).unwrap_err();

        assert_eq!(err, DomainError::NotFound);
        assert_eq!(shop.cart_badge(), 0);
    }

    #[tokio::test]
    async fn cart_survives_a_new_session() {
        let slot = Arc::new(InMemorySlot::new());
        {
            let mut shop = storefront(Arc::clone(&slot));
            shop.load_catalog().await;
            shop.add_product(&ProductId::from(1), 2).unwrap();
            shop.add_product(&ProductId::from(3), 1).unwrap();
        }

        let shop = storefront(slot);

        // Restored before any catalog load.
        assert_eq!(shop.cart_badge(), 3);
        assert_eq!(shop.cart().total_price(), 45.0);
    }

    #[tokio::test]
    async fn catalog_failure_keeps_cart_usable() {
        let source = Arc::new(InMemoryCatalogSource::new(catalog()));
        let mut shop = Storefront::new(Arc::clone(&source), CartPersistence::new(Arc::new(InMemorySlot::new())));
        shop.load_catalog().await;

        source.set_failure(Some(CatalogError::Network("offline".into())));
        let outcome = shop.load_catalog().await;

        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert_eq!(shop.catalog().len(), 3);
        shop.add_product(&ProductId::from(1), 1).unwrap();
        assert_eq!(shop.cart_badge(), 1);
    }

    #[tokio::test]
    async fn checkout_empties_badge() {
        let mut shop = storefront(Arc::new(InMemorySlot::new()));
        shop.load_catalog().await;
        shop.add_product(&ProductId::from(1), 1).unwrap();

        let receipt = shop.checkout().unwrap();

        assert_eq!(receipt.total_price, 20.0);
        assert_eq!(shop.cart_badge(), 0);
    }

    #[tokio::test]
    async fn session_rating_folds_into_catalog_rating() {
        let mut shop = storefront(Arc::new(InMemorySlot::new()));
        shop.load_catalog().await;
        let red = shop.catalog().find(&ProductId::from(1)).unwrap();

        shop.rate(&red.id, 5).unwrap();

        let rating = shop.rating_of(&red).unwrap();
        assert_eq!(rating.count, 11);
        assert!(shop.rate(&red.id, 1).is_err());
        // The cached snapshot itself is untouched.
        assert_eq!(shop.catalog().find(&red.id).unwrap().rating, red.rating);
    }
}
