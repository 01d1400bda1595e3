//! Read-only catalog source abstraction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use storefront_core::ProductId;

use crate::product::Product;

/// Catalog fetch failure.
///
/// Cloneable so the cache can keep the last one around as observable state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("catalog source unavailable: {0}")]
    Source(String),
}

/// Where products come from. The core only ever reads from it.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full product set, in catalog order.
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError>;

    /// Fetch a single product. `Ok(None)` means the catalog does not know it.
    async fn fetch_one(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<S> CatalogSource for Arc<S>
where
    S: CatalogSource + ?Sized,
{
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).fetch_all().await
    }

    async fn fetch_one(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        (**self).fetch_one(id).await
    }
}

/// In-memory catalog source for tests/dev.
///
/// Serves a fixed product list; can be switched into a failing mode to
/// exercise the cache's error path.
#[derive(Debug, Default)]
pub struct InMemoryCatalogSource {
    products: RwLock<Vec<Product>>,
    failure: RwLock<Option<CatalogError>>,
    fetches: AtomicUsize,
}

impl InMemoryCatalogSource {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            ..Self::default()
        }
    }

    /// Replace the served product list.
    pub fn set_products(&self, products: Vec<Product>) {
        if let Ok(mut guard) = self.products.write() {
            *guard = products;
        }
    }

    /// Make every subsequent fetch fail with `error` (`None` restores service).
    pub fn set_failure(&self, error: Option<CatalogError>) {
        if let Ok(mut guard) = self.failure.write() {
            *guard = error;
        }
    }

    /// Number of `fetch_all`/`fetch_one` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .failure
            .read()
            .map_err(|_| CatalogError::Source("lock poisoned".to_string()))?;
        match failure.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CatalogSource for InMemoryCatalogSource {
    async fn fetch_all(&self) -> Result<Vec<Product>, CatalogError> {
        self.check_failure()?;
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::Source("lock poisoned".to_string()))?;
        Ok(products.clone())
    }

    async fn fetch_one(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        self.check_failure()?;
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::Source("lock poisoned".to_string()))?;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }
}
