//! Client facade composing transport, session, and transaction builder
//!
//! Public entry point for talking to a node: account discovery, balance
//! queries, account unlocking, and transaction submission. Each client
//! owns its connection and session state.

use crate::session::SessionManager;
use crate::transport::{RpcTransport, TcpTransport};
use crate::tx::{self, Address, TxDraft, TxHash};
use crate::wire::methods;
use crate::{ClientConfig, ClientError, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Submission pipeline states
///
/// Terminal states are `Confirmed`, `Rejected`, and `TimedOut`; nothing
/// is retried automatically, since a blind resubmit of a value transfer
/// risks a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Received,
    Validated,
    AuthChecked,
    Submitted,
    Confirmed,
    Rejected,
    TimedOut,
}

impl SubmissionStatus {
    /// Terminal state a failed submission ended in
    pub fn from_error(error: &ClientError) -> Self {
        match error {
            ClientError::RpcTimeout => SubmissionStatus::TimedOut,
            _ => SubmissionStatus::Rejected,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Confirmed | SubmissionStatus::Rejected | SubmissionStatus::TimedOut
        )
    }
}

/// Client for a single blockchain node
pub struct ChainClient {
    transport: Arc<dyn RpcTransport>,
    session: SessionManager,
    config: ClientConfig,
}

impl ChainClient {
    /// Connect to a node's RPC endpoint (`host:port`)
    pub async fn connect(endpoint: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(TcpTransport::connect(endpoint, config.clone()).await?);
        Ok(Self::with_transport(transport, config))
    }

    /// Build a client over an existing transport
    pub fn with_transport(transport: Arc<dyn RpcTransport>, config: ClientConfig) -> Self {
        let session = SessionManager::new(Arc::clone(&transport));
        Self {
            transport,
            session,
            config,
        }
    }

    /// List accounts managed by the node; an empty list is valid
    pub async fn list_accounts(&self) -> Result<Vec<Address>> {
        let result = self.transport.call(methods::LIST_ACCOUNTS, json!([])).await?;
        let raw: Vec<String> = serde_json::from_value(result)
            .map_err(|e| ClientError::Serialization(format!("account list: {}", e)))?;
        raw.iter().map(|s| s.parse()).collect()
    }

    /// Balance of an address; 0 for a valid but unfunded address
    pub async fn get_balance(&self, address: &str) -> Result<u128> {
        // validated locally before any round trip
        let address: Address = address.parse()?;
        let result = self
            .transport
            .call(methods::GET_BALANCE, json!([address, "latest"]))
            .await?;
        parse_quantity(&result)
    }

    /// Submit a transaction
    ///
    /// Pipeline: build and validate, require `from` unlocked, submit,
    /// await the transaction hash. The first failing stage aborts the
    /// whole submission; nothing is partially sent.
    pub async fn send_transaction(&self, draft: &TxDraft) -> Result<TxHash> {
        debug!(status = ?SubmissionStatus::Received, from = %draft.from, kind = draft.kind, "submission received");

        let request = tx::build(draft, &self.config)?;
        debug!(status = ?SubmissionStatus::Validated, from = %request.from, "transaction validated");

        self.session.require_unlocked(&request.from)?;
        debug!(status = ?SubmissionStatus::AuthChecked, from = %request.from, "unlock window verified");

        debug!(status = ?SubmissionStatus::Submitted, from = %request.from, "submission dispatched");
        let submitted = self
            .transport
            .call(methods::SEND_TRANSACTION, json!([request]))
            .await;

        match submitted {
            Ok(value) => {
                let hash: TxHash = value
                    .as_str()
                    .ok_or_else(|| {
                        ClientError::Serialization("expected transaction hash string".to_string())
                    })?
                    .parse()?;
                debug!(status = ?SubmissionStatus::Confirmed, hash = %hash, "transaction accepted");
                Ok(hash)
            }
            Err(e) => {
                debug!(status = ?SubmissionStatus::from_error(&e), "submission failed: {}", e);
                Err(e)
            }
        }
    }

    /// Unlock an account on the node for `duration_secs` seconds
    pub async fn unlock_account(
        &self,
        address: &str,
        passphrase: &str,
        duration_secs: u64,
    ) -> Result<()> {
        let account: Address = address.parse()?;
        self.session.unlock(&account, passphrase, duration_secs).await
    }

    /// Whether an account's unlock window is still open locally
    pub fn is_unlocked(&self, account: &Address) -> bool {
        self.session.is_unlocked(account)
    }

    /// Account that first confirmed a piece of record content
    pub async fn get_origin(&self, content: &str) -> Result<Address> {
        let result = self
            .transport
            .call(methods::GET_ORIGIN, json!([tx::encode_text(content)]))
            .await?;
        result
            .as_str()
            .ok_or_else(|| ClientError::Serialization("expected origin address string".to_string()))?
            .parse()
    }

    /// Canonical text-to-hex payload encoding
    ///
    /// Same path the transaction builder uses for `data`.
    pub fn encode_text(&self, text: &str) -> String {
        tx::encode_text(text)
    }
}

/// Parse a node-reported quantity (hex string, decimal string, integer,
/// or null for zero)
fn parse_quantity(value: &Value) -> Result<u128> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| ClientError::Serialization(format!("negative quantity: {}", n))),
        Value::String(s) => tx::Amount::from(s.as_str())
            .parse()
            .map_err(|_| ClientError::Serialization(format!("unparseable quantity: {}", s))),
        other => Err(ClientError::Serialization(format!(
            "unexpected quantity: {}",
            other
        ))),
    }
}
