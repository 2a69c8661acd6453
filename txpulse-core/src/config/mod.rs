//! Validated runtime configuration for the processors.
//!
//! Loading from flags and the environment is handled by the service crate.

mod generator;
mod monitor;

pub use generator::GeneratorConfig;
pub use monitor::WatchedPair;
