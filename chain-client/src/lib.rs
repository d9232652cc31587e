//! Typed JSON-RPC transaction client for a single blockchain node
//!
//! This crate wraps a node's JSON-RPC surface (account listing, balance
//! queries, account unlocking, transaction submission with tagged data
//! payloads) behind a small, explicit client. Each client instance owns
//! its own connection and session state; there is no ambient global
//! client. Signing, consensus, and nonce management stay on the node
//! side.

pub mod client;
pub mod session;
pub mod transport;
pub mod tx;
pub mod wire;

use std::time::Duration;

// Re-export commonly used types
pub use client::{ChainClient, SubmissionStatus};
pub use session::SessionManager;
pub use transport::{ConnectionState, RpcTransport, TcpTransport};
pub use tx::{decode_hex, encode_text, kind, Address, Amount, TransactionRequest, TxDraft, TxHash};
pub use wire::methods;

/// Client error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Connection lost")]
    ConnectionLost,

    #[error("RPC call timed out")]
    RpcTimeout,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Account locked: {0}")]
    LockedAccount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported transaction kind: {0}")]
    UnsupportedKind(u8),

    #[error("RPC error {code}: {message}")]
    RemoteRpc { code: i32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for the initial dial and for reconnects
    pub connect_timeout: Duration,
    /// Timeout for each outstanding RPC call
    pub call_timeout: Duration,
    /// Transaction kind tags the node is known to accept
    pub allowed_kinds: Vec<u8>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            call_timeout: Duration::from_secs(30),
            allowed_kinds: vec![
                kind::TRANSFER,
                kind::RECORD_CONFIRMATION,
                kind::RECORD_AUTHORIZATION,
                kind::RECORD_TRANSFER,
            ],
        }
    }
}
