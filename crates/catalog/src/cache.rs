//! Catalog cache: the last successfully fetched product set plus load state.
//!
//! State machine: `Idle → Loading → {Ready, Error}`; calling `load()` again
//! from any state goes back through `Loading`. A failed load keeps whatever
//! was cached before and only records the error.
//!
//! Overlapping loads are ordered by a fetch sequence number. Only the response
//! to the most recently issued load is applied; earlier responses that arrive
//! late are discarded, so the catalog can never regress to older data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use storefront_core::ProductId;

use crate::product::Product;
use crate::query::{CatalogQuery, CategoryFilter, SortMode};
use crate::source::{CatalogError, CatalogSource};

/// Load lifecycle of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// No load has been requested yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last applied fetch succeeded.
    Ready,
    /// The last applied fetch failed; previous data (if any) is retained.
    Error,
}

/// What a single `load()` call did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched set replaced the cache.
    Applied { count: usize },
    /// The fetch failed; the error is now the cache's error state.
    Failed(CatalogError),
    /// A later load was issued while this one was in flight; its response was
    /// dropped.
    Superseded,
}

#[derive(Debug)]
struct CatalogInner {
    products: Arc<[Product]>,
    state: LoadState,
    last_error: Option<CatalogError>,
}

/// Cache over a [`CatalogSource`].
///
/// All readers work on an `Arc` snapshot of the product set, so they never see
/// a half-replaced catalog and never wait on an in-flight fetch: the internal
/// lock is only held for the swap, never across an await.
#[derive(Debug)]
pub struct CatalogCache<S> {
    source: S,
    inner: RwLock<CatalogInner>,
    issued: AtomicU64,
}

impl<S> CatalogCache<S>
where
    S: CatalogSource,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            inner: RwLock::new(CatalogInner {
                products: Arc::from(Vec::new()),
                state: LoadState::Idle,
                last_error: None,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the full product set once. No automatic retry.
    pub async fn load(&self) -> LoadOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.write().state = LoadState::Loading;
        tracing::debug!(seq, "catalog load started");

        let result = self.source.fetch_all().await;

        let mut inner = self.write();
        let latest = self.issued.load(Ordering::SeqCst);
        if seq != latest {
            tracing::debug!(seq, latest, "discarding superseded catalog response");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(products) => {
                let count = products.len();
                inner.products = Arc::from(products);
                inner.state = LoadState::Ready;
                inner.last_error = None;
                tracing::info!(seq, count, "catalog loaded");
                LoadOutcome::Applied { count }
            }
            Err(err) => {
                tracing::warn!(seq, error = %err, "catalog load failed; keeping previous data");
                inner.state = LoadState::Error;
                inner.last_error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Look a product up in the cache, falling back to a single-product fetch.
    ///
    /// A fetched product is returned but not cached: the catalog is only ever
    /// replaced wholesale.
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        if let Some(product) = self.find(id) {
            return Ok(Some(product));
        }
        tracing::debug!(product_id = %id, "product not cached; fetching by id");
        self.source.fetch_one(id).await
    }
}

impl<S> CatalogCache<S> {
    pub fn state(&self) -> LoadState {
        self.read().state
    }

    pub fn is_loading(&self) -> bool {
        self.state() == LoadState::Loading
    }

    /// Error recorded by the last applied load, cleared by the next success.
    pub fn last_error(&self) -> Option<CatalogError> {
        self.read().last_error.clone()
    }

    /// The cached product set, in fetch order.
    pub fn products(&self) -> Arc<[Product]> {
        Arc::clone(&self.read().products)
    }

    pub fn len(&self) -> usize {
        self.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.read().products.iter().find(|p| &p.id == id).cloned()
    }

    /// Distinct categories in the order they first appear in the catalog.
    pub fn categories(&self) -> Vec<String> {
        let products = self.products();
        let mut seen: Vec<String> = Vec::new();
        for category in products.iter().filter_map(|p| p.category.as_deref()) {
            if !seen.iter().any(|c| c == category) {
                seen.push(category.to_string());
            }
        }
        seen
    }

    /// Run `query` over the cached set. Never mutates the cache.
    pub fn query(&self, query: &CatalogQuery) -> Vec<Product> {
        query.run(&self.products())
    }

    pub fn query_with(
        &self,
        filter_text: &str,
        sort: SortMode,
        category: CategoryFilter,
    ) -> Vec<Product> {
        self.query(&CatalogQuery::new(filter_text, sort, category))
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
