#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod ledger;
pub mod processors;
pub mod records;
pub mod sink;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
