use anyhow::Context;

use stockroom_cli::config::{DEFAULT_INITIAL_CASH_UNITS, INITIAL_CASH_VAR};
use stockroom_cli::{Config, scenario};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    stockroom_observability::tracing::init(&config.tracing);
    if std::env::var(INITIAL_CASH_VAR).is_err() {
        tracing::warn!("{INITIAL_CASH_VAR} not set; using default of {DEFAULT_INITIAL_CASH_UNITS}");
    }

    tracing::info!(initial_cash = %config.initial_cash, "running stockroom scenario");
    let report = scenario::run(config.initial_cash).context("scenario aborted")?;

    let json = serde_json::to_string_pretty(&report).context("failed to render report")?;
    println!("{json}");
    Ok(())
}
