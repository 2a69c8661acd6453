//! JSON-RPC client for the ledger node.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `tokio-tungstenite`.

mod node;
mod rpc;

pub use rpc::{Subscription, WsRpcClient};

/// Errors produced by the node client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, handshake, connection reset, …).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response had the right JSON shape but an unusable value.
    #[error("decode error: {0}")]
    Decode(String),

    /// The connection closed before the response arrived.
    #[error("connection closed")]
    Closed,
}
