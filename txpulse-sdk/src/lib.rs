//! Shared types for txpulse.
//!
//! - [`objects`]: serde views of accounts, blocks and chain events.
//! - [`signer`]: the opaque signing capability handed to the submitter.
//! - `client`: JSON-RPC over WebSocket client (behind the `client` feature).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signer;
