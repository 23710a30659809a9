//! Supplier domain module (event-sourced).
//!
//! Supplier listings and the purchase transaction a store uses to buy from
//! them. Pure domain logic (no IO, no storage).

pub mod item;
pub mod supplier;

pub use item::{PurchaseReceipt, SupplierItem};
pub use supplier::{
    ItemPurchased, ItemRegistered, ItemRestocked, PurchaseItem, RegisterItem, RegisterSupplier,
    RestockItem, Supplier, SupplierCommand, SupplierEvent, SupplierRegistered,
};
