use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_catalog::CatalogItem;
use stockroom_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, IndexedItems, ItemId, MarginRate, Money,
    StoreId,
};
use stockroom_events::{Event, execute};

use crate::stocked::StockedItem;

/// Aggregate root: Store.
///
/// Holds stocked items in intake order plus a cash balance. Intake debits cash,
/// sales credit `quantity * price * margin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    id: StoreId,
    name: String,
    cash_balance: Money,
    items: IndexedItems<StockedItem>,
    version: u64,
    created: bool,
}

impl Store {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: StoreId) -> Self {
        Self {
            id,
            name: String::new(),
            cash_balance: Money::ZERO,
            items: IndexedItems::new(),
            version: 0,
            created: false,
        }
    }

    /// Open a store with a starting cash balance.
    pub fn open(id: StoreId, name: impl Into<String>, initial_cash: Money) -> DomainResult<Self> {
        let mut store = Self::empty(id);
        store.run(StoreCommand::OpenStore(OpenStore {
            store_id: id,
            name: name.into(),
            initial_cash,
            occurred_at: Utc::now(),
        }))?;
        Ok(store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cash_balance(&self) -> Money {
        self.cash_balance
    }

    pub fn is_open(&self) -> bool {
        self.created
    }

    /// Stocked items in intake order.
    pub fn items(&self) -> &[StockedItem] {
        self.items.as_slice()
    }

    /// Total on-hand inventory valued at unit price.
    pub fn stock_value(&self) -> DomainResult<Money> {
        self.items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.stock_value()?))
    }

    /// First stocked item with `id`, if any. Never mutates.
    pub fn find_item_by_id(&self, id: ItemId) -> Option<&StockedItem> {
        self.items.find(id)
    }

    /// Stock-in: buy `quantity` units of `item` for `quantity * price`.
    ///
    /// Rejected with `InsufficientFunds` (and no mutation) when the cost exceeds
    /// the cash balance.
    pub fn purchase(
        &mut self,
        item: CatalogItem,
        quantity: u32,
        margin_rate: MarginRate,
    ) -> DomainResult<()> {
        self.run(StoreCommand::PurchaseItem(PurchaseItem {
            store_id: self.id,
            item,
            quantity,
            margin_rate,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Position in `items()` of the first item with `id`.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.position(id)
    }

    /// Decrement on-hand quantity of the item at `position` in `items()`,
    /// without touching cash. Reaches items shadowed by an earlier duplicate id.
    pub fn adjust_stock(&mut self, position: usize, quantity: u32) -> DomainResult<()> {
        let item_id = self
            .items
            .get(position)
            .map(StockedItem::id)
            .ok_or_else(|| DomainError::validation(format!("no stocked item at position {position}")))?;
        self.run(StoreCommand::AdjustStock(AdjustStock {
            store_id: self.id,
            position,
            item_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Remove the first item with `id`. Returns whether anything was removed.
    pub fn remove_by_id(&mut self, item_id: ItemId) -> bool {
        let result = self.run(StoreCommand::RemoveItem(RemoveItem {
            store_id: self.id,
            item_id,
            occurred_at: Utc::now(),
        }));
        result.is_ok()
    }

    /// Sell `quantity` units: check stock, decrement, then credit revenue.
    ///
    /// Returns the revenue credited. No partial fulfillment.
    pub fn sell(&mut self, item_id: ItemId, quantity: u32) -> DomainResult<Money> {
        let events = self.run(StoreCommand::SellItem(SellItem {
            store_id: self.id,
            item_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;
        let revenue = events
            .iter()
            .map(|ev| match ev {
                StoreEvent::ItemSold(e) => e.revenue,
                _ => Money::ZERO,
            })
            .try_fold(Money::ZERO, Money::checked_add)?;
        Ok(revenue)
    }

    fn run(&mut self, command: StoreCommand) -> DomainResult<Vec<StoreEvent>> {
        match execute(self, &command) {
            Ok(events) => {
                for ev in &events {
                    tracing::info!(
                        store_id = %self.id,
                        event_type = ev.event_type(),
                        cash_balance = %self.cash_balance,
                        "store event applied"
                    );
                }
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(store_id = %self.id, command = command.name(), error = %err, "store command rejected");
                Err(err)
            }
        }
    }
}

impl AggregateRoot for Store {
    type Id = StoreId;
    const AGGREGATE_TYPE: &'static str = "store";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenStore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenStore {
    pub store_id: StoreId,
    pub name: String,
    pub initial_cash: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PurchaseItem (stock-in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub store_id: StoreId,
    pub item: CatalogItem,
    pub quantity: u32,
    pub margin_rate: MarginRate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustStock (decrement only).
///
/// `position` selects the item in intake order; `item_id` must match it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub store_id: StoreId,
    pub position: usize,
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SellItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellItem {
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreCommand {
    OpenStore(OpenStore),
    PurchaseItem(PurchaseItem),
    AdjustStock(AdjustStock),
    SellItem(SellItem),
    RemoveItem(RemoveItem),
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::OpenStore(_) => "open_store",
            StoreCommand::PurchaseItem(_) => "purchase_item",
            StoreCommand::AdjustStock(_) => "adjust_stock",
            StoreCommand::SellItem(_) => "sell_item",
            StoreCommand::RemoveItem(_) => "remove_item",
        }
    }
}

/// Event: StoreOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOpened {
    pub store_id: StoreId,
    pub name: String,
    pub initial_cash: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemStocked. Carries the catalog record by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStocked {
    pub store_id: StoreId,
    pub item: CatalogItem,
    pub quantity: u32,
    pub margin_rate: MarginRate,
    pub cost: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub store_id: StoreId,
    pub position: usize,
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemSold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSold {
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub revenue: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    StoreOpened(StoreOpened),
    ItemStocked(ItemStocked),
    StockAdjusted(StockAdjusted),
    ItemSold(ItemSold),
    ItemRemoved(ItemRemoved),
}

impl Event for StoreEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StoreEvent::StoreOpened(_) => "store.opened",
            StoreEvent::ItemStocked(_) => "store.item.stocked",
            StoreEvent::StockAdjusted(_) => "store.item.stock_adjusted",
            StoreEvent::ItemSold(_) => "store.item.sold",
            StoreEvent::ItemRemoved(_) => "store.item.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StoreEvent::StoreOpened(e) => e.occurred_at,
            StoreEvent::ItemStocked(e) => e.occurred_at,
            StoreEvent::StockAdjusted(e) => e.occurred_at,
            StoreEvent::ItemSold(e) => e.occurred_at,
            StoreEvent::ItemRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Store {
    type Command = StoreCommand;
    type Event = StoreEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StoreEvent::StoreOpened(e) => {
                self.id = e.store_id;
                self.name = e.name.clone();
                self.cash_balance = e.initial_cash;
                self.items = IndexedItems::new();
                self.created = true;
            }
            StoreEvent::ItemStocked(e) => {
                self.items.push(StockedItem::from_intake(
                    e.item.clone(),
                    e.quantity,
                    e.margin_rate,
                ));
                self.cash_balance = self.cash_balance.checked_sub(e.cost).unwrap_or(Money::ZERO);
            }
            StoreEvent::StockAdjusted(e) => {
                if let Some(item) = self.items.get_mut(e.position) {
                    item.decrement(e.quantity);
                }
            }
            StoreEvent::ItemSold(e) => {
                if let Some(item) = self.items.find_mut(e.item_id) {
                    item.decrement(e.quantity);
                }
                // `handle` already proved the addition fits.
                self.cash_balance = self
                    .cash_balance
                    .checked_add(e.revenue)
                    .unwrap_or(self.cash_balance);
            }
            StoreEvent::ItemRemoved(e) => {
                self.items.remove_first(e.item_id);
            }
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StoreCommand::OpenStore(cmd) => self.handle_open(cmd),
            StoreCommand::PurchaseItem(cmd) => self.handle_purchase(cmd),
            StoreCommand::AdjustStock(cmd) => self.handle_adjust(cmd),
            StoreCommand::SellItem(cmd) => self.handle_sell(cmd),
            StoreCommand::RemoveItem(cmd) => self.handle_remove(cmd),
        }
    }
}

impl Store {
    fn ensure_open(&self, store_id: StoreId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != store_id {
            return Err(DomainError::invariant("store_id mismatch"));
        }
        Ok(())
    }

    /// Shared by adjust and sell: the item must cover `quantity`.
    fn check_stock(item: &StockedItem, quantity: u32) -> Result<&StockedItem, DomainError> {
        if !item.can_supply(quantity) {
            return Err(DomainError::InsufficientStock {
                item_id: item.id(),
                requested: quantity,
                on_hand: item.quantity_on_hand(),
            });
        }
        Ok(item)
    }

    fn handle_open(&self, cmd: &OpenStore) -> Result<Vec<StoreEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("store already open"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(vec![StoreEvent::StoreOpened(StoreOpened {
            store_id: cmd.store_id,
            name: cmd.name.clone(),
            initial_cash: cmd.initial_cash,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_purchase(&self, cmd: &PurchaseItem) -> Result<Vec<StoreEvent>, DomainError> {
        self.ensure_open(cmd.store_id)?;

        let cost = cmd.item.price().times(cmd.quantity)?;
        if cost > self.cash_balance {
            return Err(DomainError::InsufficientFunds {
                required: cost,
                available: self.cash_balance,
            });
        }

        Ok(vec![StoreEvent::ItemStocked(ItemStocked {
            store_id: cmd.store_id,
            item: cmd.item.clone(),
            quantity: cmd.quantity,
            margin_rate: cmd.margin_rate,
            cost,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_adjust(&self, cmd: &AdjustStock) -> Result<Vec<StoreEvent>, DomainError> {
        self.ensure_open(cmd.store_id)?;
        let item = self
            .items
            .get(cmd.position)
            .filter(|item| item.id() == cmd.item_id)
            .ok_or_else(|| DomainError::item_not_found(cmd.item_id))?;
        Self::check_stock(item, cmd.quantity)?;

        Ok(vec![StoreEvent::StockAdjusted(StockAdjusted {
            store_id: cmd.store_id,
            position: cmd.position,
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_sell(&self, cmd: &SellItem) -> Result<Vec<StoreEvent>, DomainError> {
        self.ensure_open(cmd.store_id)?;
        let item = self
            .items
            .find(cmd.item_id)
            .ok_or_else(|| DomainError::item_not_found(cmd.item_id))?;
        let item = Self::check_stock(item, cmd.quantity)?;

        let revenue = item.revenue_for(cmd.quantity)?;
        self.cash_balance.checked_add(revenue)?;

        Ok(vec![StoreEvent::ItemSold(ItemSold {
            store_id: cmd.store_id,
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            revenue,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Result<Vec<StoreEvent>, DomainError> {
        self.ensure_open(cmd.store_id)?;
        if !self.items.contains(cmd.item_id) {
            return Err(DomainError::item_not_found(cmd.item_id));
        }

        Ok(vec![StoreEvent::ItemRemoved(ItemRemoved {
            store_id: cmd.store_id,
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
