//! Environment configuration for the `stockroom` binary.

use anyhow::{Context, Result};

use stockroom_core::Money;
use stockroom_observability::{LogFormat, TracingConfig};

pub const INITIAL_CASH_VAR: &str = "STOCKROOM_INITIAL_CASH";
pub const LOG_FORMAT_VAR: &str = "STOCKROOM_LOG_FORMAT";

pub const DEFAULT_INITIAL_CASH_UNITS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Opening cash balance of the demo store.
    pub initial_cash: Money,
    pub tracing: TracingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let initial_cash = match lookup(INITIAL_CASH_VAR) {
            Some(raw) => {
                let units = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{INITIAL_CASH_VAR} must be a whole number, got '{raw}'"))?;
                Money::try_from_units(units)
                    .with_context(|| format!("{INITIAL_CASH_VAR} is too large"))?
            }
            None => Money::from_units(DEFAULT_INITIAL_CASH_UNITS),
        };

        let format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .with_context(|| format!("invalid {LOG_FORMAT_VAR}"))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            initial_cash,
            tracing: TracingConfig {
                format,
                ..TracingConfig::default()
            },
        })
    }
}
