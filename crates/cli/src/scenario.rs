//! Demo scenario: a store restocks from a supplier and sells to customers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use stockroom_catalog::CatalogItem;
use stockroom_core::{ItemId, MarginRate, Money, StoreId, SupplierId};
use stockroom_events::{EventBus, EventEnvelope, InMemoryEventBus};
use stockroom_infra::{CommandDispatcher, DispatchError, InMemoryJournal, Procurement, RestockOrder};
use stockroom_store::{OpenStore, SellItem, StockedItem, Store, StoreCommand};
use stockroom_supplier::{RegisterItem, RegisterSupplier, Supplier, SupplierCommand, SupplierItem};

pub const STORE_ID: StoreId = StoreId::new(1);
pub const SUPPLIER_ID: SupplierId = SupplierId::new(1);
pub const WIDGET: ItemId = ItemId::new(1);
pub const GADGET: ItemId = ItemId::new(2);

type Dispatcher =
    CommandDispatcher<Arc<InMemoryJournal>, Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>>;

/// One step of the scenario and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub store: String,
    pub cash_balance: Money,
    pub stock_value: Money,
    pub items: Vec<StockedItem>,
    pub steps: Vec<StepOutcome>,
    pub events_published: usize,
}

pub fn run(initial_cash: Money) -> Result<Report, DispatchError> {
    let dispatcher: Dispatcher =
        CommandDispatcher::new(Arc::new(InMemoryJournal::new()), Arc::new(InMemoryEventBus::new()));
    let events = dispatcher.bus().subscribe();

    setup(&dispatcher, initial_cash)?;

    let procurement = Procurement::new(&dispatcher);
    let mut steps = Vec::new();

    let restock = |item_id: ItemId, quantity: u32, margin_percent: u32| RestockOrder {
        store_id: STORE_ID,
        supplier_id: SUPPLIER_ID,
        item_id,
        quantity,
        margin_rate: MarginRate::from_percent(margin_percent),
    };

    steps.push(record(
        "restock 50 widgets at 20% margin",
        procurement
            .restock(&restock(WIDGET, 50, 20))
            .map(|o| format!("paid {}, cash now {}", o.receipt.final_price, o.cash_balance)),
    )?);
    steps.push(record(
        "restock 20 gadgets at 10% margin",
        procurement
            .restock(&restock(GADGET, 20, 10))
            .map(|o| format!("paid {}, cash now {}", o.receipt.final_price, o.cash_balance)),
    )?);
    steps.push(record("sell 5 widgets", sell(&dispatcher, WIDGET, 5))?);
    steps.push(record("sell 100 widgets", sell(&dispatcher, WIDGET, 100))?);
    steps.push(record("sell 1 unknown item", sell(&dispatcher, ItemId::new(99), 1))?);

    let store: Store = dispatcher.load(STORE_ID, Store::empty)?;
    Ok(Report {
        store: store.name().to_string(),
        cash_balance: store.cash_balance(),
        stock_value: store.stock_value()?,
        items: store.items().to_vec(),
        steps,
        events_published: events.drain().len(),
    })
}

fn setup(dispatcher: &Dispatcher, initial_cash: Money) -> Result<(), DispatchError> {
    dispatcher.dispatch(
        STORE_ID,
        StoreCommand::OpenStore(OpenStore {
            store_id: STORE_ID,
            name: "Corner Shop".to_string(),
            initial_cash,
            occurred_at: Utc::now(),
        }),
        Store::empty,
    )?;

    let founded_on = NaiveDate::from_ymd_opt(1987, 6, 15)
        .ok_or_else(|| stockroom_core::DomainError::validation("invalid founding date"))?;
    dispatcher.dispatch(
        SUPPLIER_ID,
        SupplierCommand::RegisterSupplier(RegisterSupplier {
            supplier_id: SUPPLIER_ID,
            name: "Acme Wholesale".to_string(),
            address: "12 Dock Road".to_string(),
            founded_on,
            occurred_at: Utc::now(),
        }),
        Supplier::empty,
    )?;

    let listings = [
        (
            CatalogItem::new(WIDGET, "Widget", Money::from_units(10), "General purpose widget")?,
            None,
        ),
        (
            CatalogItem::new(GADGET, "Gadget", Money::from_units(100), "Deluxe gadget")?,
            Some(40),
        ),
    ];
    for (catalog, stock) in listings {
        dispatcher.dispatch(
            SUPPLIER_ID,
            SupplierCommand::RegisterItem(RegisterItem {
                supplier_id: SUPPLIER_ID,
                item: SupplierItem::new(catalog, SUPPLIER_ID, stock),
                occurred_at: Utc::now(),
            }),
            Supplier::empty,
        )?;
    }
    Ok(())
}

fn sell(dispatcher: &Dispatcher, item_id: ItemId, quantity: u32) -> Result<String, DispatchError> {
    let (store, _) = dispatcher.dispatch(
        STORE_ID,
        StoreCommand::SellItem(SellItem {
            store_id: STORE_ID,
            item_id,
            quantity,
            occurred_at: Utc::now(),
        }),
        Store::empty,
    )?;
    Ok(format!("cash now {}", store.cash_balance()))
}

/// Domain rejections become failed steps; anything else aborts the scenario.
fn record(step: &str, result: Result<String, DispatchError>) -> Result<StepOutcome, DispatchError> {
    match result {
        Ok(detail) => Ok(StepOutcome {
            step: step.to_string(),
            ok: true,
            detail,
        }),
        Err(DispatchError::Domain(err)) => Ok(StepOutcome {
            step: step.to_string(),
            ok: false,
            detail: err.to_string(),
        }),
        Err(other) => Err(other),
    }
}
