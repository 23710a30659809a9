//! Domain error model.

use thiserror::Error;

use crate::id::ItemId;
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant describes a rejected command: the aggregate that produced it
/// has not been mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The aggregate itself does not exist yet.
    #[error("not found")]
    NotFound,

    /// No item with this id is held by the store or supplier.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// The store cannot pay for an intake.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },

    /// Not enough units on hand to satisfy a decrement.
    #[error("insufficient stock for item {item_id}: requested {requested}, on hand {on_hand}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u32,
        on_hand: u32,
    },

    /// A conflict occurred (e.g. already created, stale version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn item_not_found(item_id: ItemId) -> Self {
        Self::ItemNotFound(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = DomainError::InsufficientFunds {
            required: Money::from_units(2000),
            available: Money::from_units(500),
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: required 2000.00, available 500.00"
        );

        let err = DomainError::InsufficientStock {
            item_id: ItemId::new(7),
            requested: 5,
            on_hand: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for item 7: requested 5, on hand 2"
        );

        assert_eq!(
            DomainError::item_not_found(ItemId::new(9)).to_string(),
            "item 9 not found"
        );
    }
}
