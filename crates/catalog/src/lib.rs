//! Catalog domain module.
//!
//! The catalog record shared by store inventory and supplier listings.

pub mod item;

pub use item::CatalogItem;
