//! Unlocked-account session tracking
//!
//! The node is authoritative about which accounts are unlocked; this
//! manager mirrors the unlock windows it has requested so signing
//! submissions for a locked account fail fast locally, before a round
//! trip. Nothing is persisted; the session dies with the client.

use crate::transport::RpcTransport;
use crate::tx::Address;
use crate::wire::methods;
use crate::{ClientError, Result};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Tracks unlock windows per account
pub struct SessionManager {
    transport: Arc<dyn RpcTransport>,
    /// Account -> unlock expiry
    unlocked: Mutex<HashMap<Address, Instant>>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            unlocked: Mutex::new(HashMap::new()),
        }
    }

    /// Ask the node to unlock an account for `duration_secs` seconds
    ///
    /// A zero duration is forwarded to the node but never recorded
    /// locally: a zero-length window has already expired by the time the
    /// call returns, so `is_unlocked` stays false.
    pub async fn unlock(
        &self,
        account: &Address,
        passphrase: &str,
        duration_secs: u64,
    ) -> Result<()> {
        let params = json!([account, passphrase, duration_secs]);
        let result = self.transport.call(methods::UNLOCK_ACCOUNT, params).await;

        let accepted = match result {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(ClientError::RemoteRpc { message, .. }) => {
                return Err(ClientError::Authentication(message));
            }
            Err(e) => return Err(e),
        };
        if !accepted {
            return Err(ClientError::Authentication(format!(
                "node refused to unlock {}",
                account
            )));
        }

        if duration_secs > 0 {
            let expiry = Instant::now() + Duration::from_secs(duration_secs);
            self.unlocked.lock().unwrap().insert(account.clone(), expiry);
            debug!("account {} unlocked for {}s", account, duration_secs);
        }
        Ok(())
    }

    /// Whether the account's unlock window is still open
    pub fn is_unlocked(&self, account: &Address) -> bool {
        self.unlocked
            .lock()
            .unwrap()
            .get(account)
            .map(|expiry| Instant::now() < *expiry)
            .unwrap_or(false)
    }

    /// Fail fast if the account is not currently unlocked
    pub fn require_unlocked(&self, account: &Address) -> Result<()> {
        if self.is_unlocked(account) {
            Ok(())
        } else {
            Err(ClientError::LockedAccount(account.to_string()))
        }
    }

    /// Drop the local unlock window for an account
    pub fn lock(&self, account: &Address) {
        self.unlocked.lock().unwrap().remove(account);
    }
}
