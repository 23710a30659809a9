//! Restocking a store from a supplier.
//!
//! The supplier sale and the store intake are two separate streams. Both
//! preconditions (supplier availability, store funds) are checked up front so
//! a rejected restock commits nothing on either side.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, ItemId, MarginRate, Money, StoreId, SupplierId};
use stockroom_events::{EventBus, EventEnvelope};
use stockroom_store::{PurchaseItem as StoreIntake, StockedItem, Store, StoreCommand};
use stockroom_supplier::{
    PurchaseItem as SupplierSale, PurchaseReceipt, Supplier, SupplierCommand,
};

use crate::command_dispatcher::{CommandDispatcher, DispatchError};
use crate::journal::EventJournal;

/// A request to move `quantity` units of `item_id` from a supplier into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockOrder {
    pub store_id: StoreId,
    pub supplier_id: SupplierId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub margin_rate: MarginRate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockOutcome {
    pub receipt: PurchaseReceipt,
    pub stocked: StockedItem,
    pub cash_balance: Money,
}

/// Procurement service over a shared dispatcher.
#[derive(Debug)]
pub struct Procurement<'a, J, B> {
    dispatcher: &'a CommandDispatcher<J, B>,
}

impl<'a, J, B> Procurement<'a, J, B>
where
    J: EventJournal,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(dispatcher: &'a CommandDispatcher<J, B>) -> Self {
        Self { dispatcher }
    }

    pub fn restock(&self, order: &RestockOrder) -> Result<RestockOutcome, DispatchError> {
        // Pre-checks: nothing is committed until both sides agree.
        let supplier: Supplier = self.dispatcher.load(order.supplier_id, Supplier::empty)?;
        if !supplier.is_registered() {
            return Err(DomainError::not_found().into());
        }
        let cost = supplier.quote(order.item_id, order.quantity)?;

        let store: Store = self.dispatcher.load(order.store_id, Store::empty)?;
        if !store.is_open() {
            return Err(DomainError::not_found().into());
        }
        if cost > store.cash_balance() {
            let err = DomainError::InsufficientFunds {
                required: cost,
                available: store.cash_balance(),
            };
            tracing::warn!(store_id = %order.store_id, error = %err, "restock rejected");
            return Err(err.into());
        }

        let (supplier, _) = self.dispatcher.dispatch(
            order.supplier_id,
            SupplierCommand::PurchaseItem(SupplierSale {
                supplier_id: order.supplier_id,
                item_id: order.item_id,
                quantity: order.quantity,
                occurred_at: Utc::now(),
            }),
            Supplier::empty,
        )?;
        let purchased_item = supplier
            .find_item_by_id(order.item_id)
            .cloned()
            .ok_or_else(|| DomainError::item_not_found(order.item_id))?;
        let receipt = PurchaseReceipt {
            final_price: cost,
            purchased_item,
            quantity: order.quantity,
        };

        let intake = self.dispatcher.dispatch(
            order.store_id,
            StoreCommand::PurchaseItem(StoreIntake {
                store_id: order.store_id,
                item: receipt.purchased_item.catalog().clone(),
                quantity: order.quantity,
                margin_rate: order.margin_rate,
                occurred_at: Utc::now(),
            }),
            Store::empty,
        );
        let (store, _) = match intake {
            Ok(done) => done,
            Err(err) => {
                // Only reachable if the store stream moved between the pre-check and here.
                tracing::error!(
                    store_id = %order.store_id,
                    supplier_id = %order.supplier_id,
                    item_id = %order.item_id,
                    error = %err,
                    "supplier sale committed but store intake failed"
                );
                return Err(err);
            }
        };

        let stocked = store
            .items()
            .last()
            .cloned()
            .ok_or_else(|| DomainError::invariant("intake produced no stocked item"))?;

        tracing::info!(
            store_id = %order.store_id,
            supplier_id = %order.supplier_id,
            item_id = %order.item_id,
            quantity = order.quantity,
            cost = %cost,
            "restock completed"
        );

        Ok(RestockOutcome {
            receipt,
            stocked,
            cash_balance: store.cash_balance(),
        })
    }
}
