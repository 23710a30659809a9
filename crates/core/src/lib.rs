//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod collection;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use collection::IndexedItems;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, StoreId, SupplierId};
pub use money::{MarginRate, Money};
pub use value_object::ValueObject;
