//! Catalog side of the storefront: product snapshots, the read-only catalog
//! source, and the cache that answers filter/sort queries over the last
//! successful fetch.
//!
//! Nothing here mutates a product snapshot. Ratings the shopper gives during a
//! session live in [`SessionRatings`], an overlay that is never persisted.

pub mod cache;
#[cfg(feature = "http")]
pub mod http;
pub mod product;
pub mod query;
pub mod rating;
pub mod record;
pub mod source;

pub use cache::{CatalogCache, LoadOutcome, LoadState};
#[cfg(feature = "http")]
pub use http::HttpCatalogSource;
pub use product::{Product, Rating};
pub use query::{CatalogQuery, CategoryFilter, SortMode};
pub use rating::SessionRatings;
pub use record::{ProductRecord, products_from_records, products_from_values};
pub use source::{CatalogError, CatalogSource, InMemoryCatalogSource};
