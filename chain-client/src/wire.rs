//! JSON-RPC 2.0 wire types and method names
//!
//! Frames are single JSON objects, newline-delimited on the socket.
//! Every request carries a correlation id; the node echoes it back on
//! the matching response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl RpcRequest {
    /// Create a request with the given correlation id
    pub fn new(method: &str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }
}

/// Standard JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
    pub id: u64,
}

/// Node-reported RPC error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// RPC methods consumed on the node
pub mod methods {
    /// List accounts managed by the node
    pub const LIST_ACCOUNTS: &str = "eth_accounts";

    /// Get balance of an address
    pub const GET_BALANCE: &str = "eth_getBalance";

    /// Submit a transaction for signing and broadcast
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";

    /// Unlock an account for signing operations
    pub const UNLOCK_ACCOUNT: &str = "personal_unlockAccount";

    /// Look up the account that first confirmed a piece of record content
    pub const GET_ORIGIN: &str = "eth_getOrigin";
}
