//! Store domain module (event-sourced).
//!
//! Stocked inventory and the cash balance of a single store, implemented as
//! deterministic domain logic (no IO, no storage).

pub mod stocked;
pub mod store;

pub use stocked::StockedItem;
pub use store::{
    AdjustStock, ItemRemoved, ItemSold, ItemStocked, OpenStore, PurchaseItem, RemoveItem,
    SellItem, StockAdjusted, Store, StoreCommand, StoreEvent, StoreOpened,
};
