use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_catalog::CatalogItem;
use stockroom_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, IndexedItems, ItemId, Money, SupplierId,
};
use stockroom_events::{Event, execute};

use crate::item::{PurchaseReceipt, SupplierItem};

/// Aggregate root: Supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    address: String,
    founded_on: Option<NaiveDate>,
    items: IndexedItems<SupplierItem>,
    version: u64,
    created: bool,
}

impl Supplier {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: SupplierId) -> Self {
        Self {
            id,
            name: String::new(),
            address: String::new(),
            founded_on: None,
            items: IndexedItems::new(),
            version: 0,
            created: false,
        }
    }

    pub fn register(
        id: SupplierId,
        name: impl Into<String>,
        address: impl Into<String>,
        founded_on: NaiveDate,
    ) -> DomainResult<Self> {
        let mut supplier = Self::empty(id);
        supplier.run(SupplierCommand::RegisterSupplier(RegisterSupplier {
            supplier_id: id,
            name: name.into(),
            address: address.into(),
            founded_on,
            occurred_at: Utc::now(),
        }))?;
        Ok(supplier)
    }

    pub fn is_registered(&self) -> bool {
        self.created
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn founded_on(&self) -> Option<NaiveDate> {
        self.founded_on
    }

    pub fn items(&self) -> &[SupplierItem] {
        self.items.as_slice()
    }

    pub fn find_item_by_id(&self, id: ItemId) -> Option<&SupplierItem> {
        self.items.find(id)
    }

    /// List an item the supplier can always provide. Duplicate ids are kept;
    /// lookups resolve to the first.
    pub fn register_item(
        &mut self,
        name: impl Into<String>,
        price: Money,
        id: ItemId,
        description: impl Into<String>,
        supplier_id: SupplierId,
    ) -> DomainResult<()> {
        let catalog = CatalogItem::new(id, name, price, description)?;
        self.list(SupplierItem::new(catalog, supplier_id, None))
    }

    /// List an item with a bounded stock count.
    pub fn register_stocked_item(
        &mut self,
        name: impl Into<String>,
        price: Money,
        id: ItemId,
        description: impl Into<String>,
        supplier_id: SupplierId,
        stock: u32,
    ) -> DomainResult<()> {
        let catalog = CatalogItem::new(id, name, price, description)?;
        self.list(SupplierItem::new(catalog, supplier_id, Some(stock)))
    }

    fn list(&mut self, item: SupplierItem) -> DomainResult<()> {
        self.run(SupplierCommand::RegisterItem(RegisterItem {
            supplier_id: self.id,
            item,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Add units to an item that tracks stock.
    pub fn restock_item(&mut self, item_id: ItemId, quantity: u32) -> DomainResult<()> {
        self.run(SupplierCommand::RestockItem(RestockItem {
            supplier_id: self.id,
            item_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Price of `quantity` units of `item_id`, checking availability without
    /// mutating anything.
    pub fn quote(&self, item_id: ItemId, quantity: u32) -> DomainResult<Money> {
        let item = self
            .items
            .find(item_id)
            .ok_or_else(|| DomainError::item_not_found(item_id))?;
        if !item.has_available(quantity) {
            return Err(DomainError::InsufficientStock {
                item_id,
                requested: quantity,
                on_hand: item.stock().unwrap_or_default(),
            });
        }
        item.price().times(quantity)
    }

    /// Sell `quantity` units, decrementing stock when the item tracks it.
    pub fn purchase(&mut self, item_id: ItemId, quantity: u32) -> DomainResult<PurchaseReceipt> {
        let events = self.run(SupplierCommand::PurchaseItem(PurchaseItem {
            supplier_id: self.id,
            item_id,
            quantity,
            occurred_at: Utc::now(),
        }))?;

        let final_price = events
            .iter()
            .find_map(|ev| match ev {
                SupplierEvent::ItemPurchased(e) => Some(e.final_price),
                _ => None,
            })
            .ok_or_else(|| DomainError::invariant("purchase emitted no ItemPurchased event"))?;
        let purchased_item = self
            .items
            .find(item_id)
            .cloned()
            .ok_or_else(|| DomainError::item_not_found(item_id))?;

        Ok(PurchaseReceipt {
            final_price,
            purchased_item,
            quantity,
        })
    }

    fn run(&mut self, command: SupplierCommand) -> DomainResult<Vec<SupplierEvent>> {
        match execute(self, &command) {
            Ok(events) => {
                for ev in &events {
                    tracing::info!(supplier_id = %self.id, event_type = ev.event_type(), "supplier event applied");
                }
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(supplier_id = %self.id, error = %err, "supplier command rejected");
                Err(err)
            }
        }
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;
    const AGGREGATE_TYPE: &'static str = "supplier";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterSupplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSupplier {
    pub supplier_id: SupplierId,
    pub name: String,
    pub address: String,
    pub founded_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RegisterItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterItem {
    pub supplier_id: SupplierId,
    pub item: SupplierItem,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RestockItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockItem {
    pub supplier_id: SupplierId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PurchaseItem (a sale from the supplier's point of view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub supplier_id: SupplierId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierCommand {
    RegisterSupplier(RegisterSupplier),
    RegisterItem(RegisterItem),
    RestockItem(RestockItem),
    PurchaseItem(PurchaseItem),
}

/// Event: SupplierRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRegistered {
    pub supplier_id: SupplierId,
    pub name: String,
    pub address: String,
    pub founded_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRegistered {
    pub supplier_id: SupplierId,
    pub item: SupplierItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRestocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRestocked {
    pub supplier_id: SupplierId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemPurchased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPurchased {
    pub supplier_id: SupplierId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub final_price: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierEvent {
    SupplierRegistered(SupplierRegistered),
    ItemRegistered(ItemRegistered),
    ItemRestocked(ItemRestocked),
    ItemPurchased(ItemPurchased),
}

impl Event for SupplierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SupplierEvent::SupplierRegistered(_) => "supplier.registered",
            SupplierEvent::ItemRegistered(_) => "supplier.item.registered",
            SupplierEvent::ItemRestocked(_) => "supplier.item.restocked",
            SupplierEvent::ItemPurchased(_) => "supplier.item.purchased",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SupplierEvent::SupplierRegistered(e) => e.occurred_at,
            SupplierEvent::ItemRegistered(e) => e.occurred_at,
            SupplierEvent::ItemRestocked(e) => e.occurred_at,
            SupplierEvent::ItemPurchased(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Supplier {
    type Command = SupplierCommand;
    type Event = SupplierEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SupplierEvent::SupplierRegistered(e) => {
                self.id = e.supplier_id;
                self.name = e.name.clone();
                self.address = e.address.clone();
                self.founded_on = Some(e.founded_on);
                self.items = IndexedItems::new();
                self.created = true;
            }
            SupplierEvent::ItemRegistered(e) => {
                self.items.push(e.item.clone());
            }
            SupplierEvent::ItemRestocked(e) => {
                if let Some(item) = self.items.find_mut(e.item_id) {
                    item.add(e.quantity);
                }
            }
            SupplierEvent::ItemPurchased(e) => {
                if let Some(item) = self.items.find_mut(e.item_id) {
                    item.take(e.quantity);
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SupplierCommand::RegisterSupplier(cmd) => self.handle_register(cmd),
            SupplierCommand::RegisterItem(cmd) => self.handle_register_item(cmd),
            SupplierCommand::RestockItem(cmd) => self.handle_restock(cmd),
            SupplierCommand::PurchaseItem(cmd) => self.handle_purchase(cmd),
        }
    }
}

impl Supplier {
    fn ensure_registered(&self, supplier_id: SupplierId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != supplier_id {
            return Err(DomainError::invariant("supplier_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterSupplier) -> Result<Vec<SupplierEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("supplier already registered"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(vec![SupplierEvent::SupplierRegistered(SupplierRegistered {
            supplier_id: cmd.supplier_id,
            name: cmd.name.clone(),
            address: cmd.address.clone(),
            founded_on: cmd.founded_on,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_register_item(&self, cmd: &RegisterItem) -> Result<Vec<SupplierEvent>, DomainError> {
        self.ensure_registered(cmd.supplier_id)?;
        Ok(vec![SupplierEvent::ItemRegistered(ItemRegistered {
            supplier_id: cmd.supplier_id,
            item: cmd.item.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_restock(&self, cmd: &RestockItem) -> Result<Vec<SupplierEvent>, DomainError> {
        self.ensure_registered(cmd.supplier_id)?;
        let item = self
            .items
            .find(cmd.item_id)
            .ok_or_else(|| DomainError::item_not_found(cmd.item_id))?;
        let Some(on_hand) = item.stock() else {
            return Err(DomainError::validation("item does not track stock"));
        };
        if on_hand.checked_add(cmd.quantity).is_none() {
            return Err(DomainError::validation("stock overflow"));
        }
        Ok(vec![SupplierEvent::ItemRestocked(ItemRestocked {
            supplier_id: cmd.supplier_id,
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_purchase(&self, cmd: &PurchaseItem) -> Result<Vec<SupplierEvent>, DomainError> {
        self.ensure_registered(cmd.supplier_id)?;
        let final_price = self.quote(cmd.item_id, cmd.quantity)?;
        Ok(vec![SupplierEvent::ItemPurchased(ItemPurchased {
            supplier_id: cmd.supplier_id,
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            final_price,
            occurred_at: cmd.occurred_at,
        })])
    }
}
