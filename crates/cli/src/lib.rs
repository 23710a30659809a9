//! Command-line front end: environment config and the demo scenario.

pub mod config;
pub mod scenario;

pub use config::Config;
pub use scenario::{Report, StepOutcome};
