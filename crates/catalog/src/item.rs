use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, Money, ValueObject};

/// A product definition, independent of any store's inventory.
///
/// Stores and suppliers embed their own copy of this record. Fields only change
/// through the setters below, which apply the same validation as `new`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItem {
    id: ItemId,
    name: String,
    price: Money,
    description: String,
}

impl CatalogItem {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        price: Money,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id,
            name,
            price,
            description: description.into(),
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_price(&mut self, price: Money) {
        self.price = price;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

impl ValueObject for CatalogItem {}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> CatalogItem {
        CatalogItem::new(ItemId::new(1), "Widget", Money::from_units(10), "A widget").unwrap()
    }

    #[test]
    fn new_keeps_all_fields() {
        let item = widget();
        assert_eq!(item.id(), ItemId::new(1));
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.price(), Money::from_units(10));
        assert_eq!(item.description(), "A widget");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = CatalogItem::new(ItemId::new(1), "   ", Money::ZERO, "").unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("name cannot be empty") => {}
            _ => panic!("Expected validation error for blank name"),
        }
    }

    #[test]
    fn setters_validate_like_new() {
        let mut item = widget();
        assert!(item.set_name("").is_err());
        assert_eq!(item.name(), "Widget");

        item.set_name("Gadget").unwrap();
        item.set_price(Money::from_cents(1999));
        item.set_description("Shiny");
        item.set_id(ItemId::new(2));
        assert_eq!(item.id(), ItemId::new(2));
        assert_eq!(item.name(), "Gadget");
        assert_eq!(item.price(), Money::from_cents(1999));
        assert_eq!(item.description(), "Shiny");
    }

    #[test]
    fn copies_compare_by_value() {
        let a = widget();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.set_price(Money::from_units(11));
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_price_in_cents() {
        let json = serde_json::to_value(widget()).unwrap();
        assert_eq!(json["price"], 1000);
        assert_eq!(json["id"], 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: any name with a visible character is accepted verbatim.
            #[test]
            fn visible_names_are_accepted(name in "[A-Za-z][A-Za-z0-9 ]{0,49}") {
                let item = CatalogItem::new(ItemId::new(1), name.clone(), Money::ZERO, "").unwrap();
                prop_assert_eq!(item.name(), name.as_str());
            }
        }
    }
}
