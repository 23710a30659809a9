//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are compared by their attribute values and are replaced rather
/// than modified. `Money`, `MarginRate` and `CatalogItem` are value objects: a
/// store keeps its own copy of a catalog record, never a reference to the
/// supplier's.
///
/// ```ignore
/// let a = Money::from_units(10);
/// let b = Money::from_cents(1000);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
