//! Money and margin value objects.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

const CENTS_PER_UNIT: u64 = 100;
const BASIS_POINTS_PER_UNIT: u128 = 10_000;

/// Non-negative amount in the smallest currency unit (cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Whole currency units (e.g. `from_units(10)` is 10.00). Saturates at the
    /// largest representable amount; use `try_from_units` for untrusted input.
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(CENTS_PER_UNIT))
    }

    pub fn try_from_units(units: u64) -> DomainResult<Self> {
        units
            .checked_mul(CENTS_PER_UNIT)
            .map(Money)
            .ok_or_else(|| DomainError::validation("amount overflow"))
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::validation("amount overflow"))
    }

    /// `None` when `other` is larger than `self`; money never goes negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Unit price times a quantity.
    pub fn times(self, quantity: u32) -> DomainResult<Money> {
        self.0
            .checked_mul(u64::from(quantity))
            .map(Money)
            .ok_or_else(|| DomainError::validation("amount overflow"))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / CENTS_PER_UNIT, self.0 % CENTS_PER_UNIT)
    }
}

impl ValueObject for Money {}

/// Multiplier applied to a sale amount to get the store's revenue, in basis points.
///
/// `MarginRate::from_basis_points(2000)` is a rate of 0.20.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarginRate(u32);

impl MarginRate {
    pub const fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    /// Saturates at `u32::MAX` basis points.
    pub const fn from_percent(percent: u32) -> Self {
        Self(percent.saturating_mul(100))
    }

    /// Converts a decimal ratio (0.2 => 2000 bp), rounding to the nearest basis point.
    pub fn from_ratio(ratio: f64) -> DomainResult<Self> {
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(DomainError::validation(
                "margin rate must be a non-negative number",
            ));
        }
        let bp = (ratio * BASIS_POINTS_PER_UNIT as f64).round();
        if bp > f64::from(u32::MAX) {
            return Err(DomainError::validation("margin rate too large"));
        }
        Ok(Self(bp as u32))
    }

    pub const fn basis_points(&self) -> u32 {
        self.0
    }

    /// `amount * rate`, rounded half-up to the cent.
    pub fn apply(self, amount: Money) -> DomainResult<Money> {
        let scaled = u128::from(amount.cents()) * u128::from(self.0);
        let rounded = (scaled + BASIS_POINTS_PER_UNIT / 2) / BASIS_POINTS_PER_UNIT;
        u64::try_from(rounded)
            .map(Money::from_cents)
            .map_err(|_| DomainError::validation("amount overflow"))
    }
}

impl core::fmt::Display for MarginRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:04}", self.0 / 10_000, self.0 % 10_000)
    }
}

impl ValueObject for MarginRate {}
