use serde::{Deserialize, Serialize};

use stockroom_catalog::CatalogItem;
use stockroom_core::{DomainResult, Entity, ItemId, MarginRate, Money};

/// A catalog item as held by a store: the catalog record plus on-hand
/// quantity and the margin applied when it is sold.
///
/// Only the store's intake creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockedItem {
    catalog: CatalogItem,
    quantity_on_hand: u32,
    margin_rate: MarginRate,
}

impl StockedItem {
    pub(crate) fn from_intake(catalog: CatalogItem, quantity: u32, margin_rate: MarginRate) -> Self {
        Self {
            catalog,
            quantity_on_hand: quantity,
            margin_rate,
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

    pub fn description(&self) -> &str {
        self.catalog.description()
    }

    pub fn quantity_on_hand(&self) -> u32 {
        self.quantity_on_hand
    }

    pub fn margin_rate(&self) -> MarginRate {
        self.margin_rate
    }

    pub fn can_supply(&self, quantity: u32) -> bool {
        quantity <= self.quantity_on_hand
    }

    /// Revenue credited for selling `quantity` units: `quantity * price * margin`.
    pub fn revenue_for(&self, quantity: u32) -> DomainResult<Money> {
        self.margin_rate.apply(self.price().times(quantity)?)
    }

    /// On-hand quantity valued at unit price.
    pub fn stock_value(&self) -> DomainResult<Money> {
        self.price().times(self.quantity_on_hand)
    }

    /// Callers check `can_supply` first.
    pub(crate) fn decrement(&mut self, quantity: u32) {
        self.quantity_on_hand = self.quantity_on_hand.saturating_sub(quantity);
    }
}

impl Entity for StockedItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.catalog.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked(price_units: u64, quantity: u32, margin_pct: u32) -> StockedItem {
        let catalog =
            CatalogItem::new(ItemId::new(1), "Widget", Money::from_units(price_units), "").unwrap();
        StockedItem::from_intake(catalog, quantity, MarginRate::from_percent(margin_pct))
    }

    #[test]
    fn revenue_is_quantity_times_price_times_margin() {
        let item = stocked(10, 50, 20);
        assert_eq!(item.revenue_for(5).unwrap(), Money::from_units(10));
    }

    #[test]
    fn stock_value_uses_on_hand_quantity() {
        let item = stocked(10, 50, 20);
        assert_eq!(item.stock_value().unwrap(), Money::from_units(500));
    }

    #[test]
    fn can_supply_up_to_on_hand() {
        let item = stocked(1, 3, 0);
        assert!(item.can_supply(0));
        assert!(item.can_supply(3));
        assert!(!item.can_supply(4));
    }
}
