//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog and
//! cart crates (no IO, no storage, no async).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod price;
pub mod value_object;

pub use aggregate::Aggregate;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{OrderId, ProductId};
pub use price::{Price, format_amount};
pub use value_object::ValueObject;
