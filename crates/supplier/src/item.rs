use serde::{Deserialize, Serialize};

use stockroom_catalog::CatalogItem;
use stockroom_core::{Entity, ItemId, Money, SupplierId};

/// A catalog item as listed by a supplier.
///
/// `stock` is `None` for items the supplier can always provide; otherwise it
/// bounds how many units a purchase may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierItem {
    catalog: CatalogItem,
    supplier_id: SupplierId,
    stock: Option<u32>,
}

impl SupplierItem {
    pub fn new(catalog: CatalogItem, supplier_id: SupplierId, stock: Option<u32>) -> Self {
        Self {
            catalog,
            supplier_id,
            stock,
        }
    }

    pub fn catalog(&self) -> &CatalogItem {
        &self.catalog
    }

    pub fn id(&self) -> ItemId {
        self.catalog.id()
    }

    pub fn name(&self) -> &str {
        self.catalog.name()
    }

    pub fn price(&self) -> Money {
        self.catalog.price()
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn stock(&self) -> Option<u32> {
        self.stock
    }

    pub fn has_available(&self, quantity: u32) -> bool {
        self.stock.is_none_or(|on_hand| quantity <= on_hand)
    }

    pub(crate) fn take(&mut self, quantity: u32) {
        if let Some(on_hand) = self.stock.as_mut() {
            *on_hand = on_hand.saturating_sub(quantity);
        }
    }

    pub(crate) fn add(&mut self, quantity: u32) {
        if let Some(on_hand) = self.stock.as_mut() {
            *on_hand = on_hand.saturating_add(quantity);
        }
    }
}

impl Entity for SupplierItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.catalog.id()
    }
}

/// Result of a supplier sale: `final_price = price * quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub final_price: Money,
    pub purchased_item: SupplierItem,
    pub quantity: u32,
}
