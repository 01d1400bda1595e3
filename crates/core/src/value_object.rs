//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: they are defined entirely by their
/// attribute values and are never modified in place. To "change" one, build a
/// new one.
///
/// - **Value Object**: `Price(19.99)`, a product rating
/// - **Entity**: a product, identified by its `ProductId`
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
