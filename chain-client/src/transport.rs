//! JSON-RPC transport over a persistent TCP connection
//!
//! One duplex connection per transport. Outgoing writes are serialized
//! through a single writer task; responses are routed back to callers
//! strictly by correlation id, so out-of-order arrival from the node is
//! handled without blocking unrelated calls. On disconnect every
//! outstanding call resolves with `ConnectionLost` and the transport can
//! be re-dialed through `reconnect`.

use crate::wire::{RpcRequest, RpcResponse};
use crate::{ClientConfig, ClientError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Transport seam consumed by the client facade and session manager
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Issue an RPC call and await the matching response's result
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

/// Connection lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected, with the reason for the last disconnect
    Disconnected { reason: String },
    /// Dial in progress
    Connecting,
    /// Connected and serving calls
    Connected,
}

/// State shared between callers and the reader/writer tasks
struct TransportShared {
    /// Outstanding calls, keyed by correlation id; each entry receives
    /// exactly one verdict from the reader, its deadline task, or the
    /// disconnect path
    pending: Mutex<HashMap<u64, oneshot::Sender<Result<RpcResponse>>>>,
    /// Connection lifecycle state
    state: Mutex<ConnectionState>,
    /// Sender feeding the writer task; None while disconnected
    writer_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

/// Transport over a single TCP connection carrying newline-delimited
/// JSON-RPC frames
pub struct TcpTransport {
    endpoint: String,
    config: ClientConfig,
    next_id: AtomicU64,
    shared: Arc<TransportShared>,
}

impl TcpTransport {
    /// Connect to the node's RPC endpoint
    pub async fn connect(endpoint: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let transport = Self {
            endpoint: endpoint.into(),
            config,
            next_id: AtomicU64::new(1),
            shared: Arc::new(TransportShared {
                pending: Mutex::new(HashMap::new()),
                state: Mutex::new(ConnectionState::Disconnected {
                    reason: "never connected".to_string(),
                }),
                writer_tx: Mutex::new(None),
            }),
        };
        transport.dial().await?;
        Ok(transport)
    }

    /// Current connection state
    pub async fn state(&self) -> ConnectionState {
        self.shared.state.lock().await.clone()
    }

    /// Re-dial the endpoint after a disconnect
    ///
    /// No-op while connected or while another caller's dial is already
    /// in progress. Correlation ids keep increasing across reconnects.
    pub async fn reconnect(&self) -> Result<()> {
        {
            // check and transition under one guard so concurrent callers
            // cannot both dial
            let mut state = self.shared.state.lock().await;
            match *state {
                ConnectionState::Connected | ConnectionState::Connecting => return Ok(()),
                ConnectionState::Disconnected { .. } => *state = ConnectionState::Connecting,
            }
        }
        self.dial().await
    }

    async fn dial(&self) -> Result<()> {
        *self.shared.state.lock().await = ConnectionState::Connecting;

        let dialed = timeout(
            self.config.connect_timeout,
            TcpStream::connect(&self.endpoint),
        )
        .await;
        let stream = match dialed {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                *self.shared.state.lock().await = ConnectionState::Disconnected {
                    reason: e.to_string(),
                };
                return Err(ClientError::ConnectionFailed(e.to_string()));
            }
            Err(_) => {
                *self.shared.state.lock().await = ConnectionState::Disconnected {
                    reason: "connect timeout".to_string(),
                };
                return Err(ClientError::ConnectionTimeout);
            }
        };

        let (read_half, write_half) = stream.into_split();
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();

        *self.shared.writer_tx.lock().await = Some(writer_tx);
        *self.shared.state.lock().await = ConnectionState::Connected;

        spawn_writer(Arc::clone(&self.shared), write_half, writer_rx);
        spawn_reader(Arc::clone(&self.shared), read_half);

        debug!("connected to {}", self.endpoint);
        Ok(())
    }
}

#[async_trait]
impl RpcTransport for TcpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(method, params, id);
        let mut frame = serde_json::to_string(&request)
            .map_err(|e| ClientError::Serialization(e.to_string()))?;
        frame.push('\n');

        // register before sending so a fast response can never miss the map
        let (response_tx, response_rx) = oneshot::channel();
        self.shared.pending.lock().await.insert(id, response_tx);

        let sent = match self.shared.writer_tx.lock().await.as_ref() {
            Some(writer) => writer.send(frame).is_ok(),
            None => false,
        };
        if !sent {
            self.shared.pending.lock().await.remove(&id);
            return Err(ClientError::ConnectionLost);
        }
        debug!(id, method, "rpc call dispatched");

        // the deadline runs as its own task, so the entry is removed on
        // time even if this future is abandoned mid-call
        spawn_deadline(
            Arc::clone(&self.shared),
            id,
            method.to_string(),
            self.config.call_timeout,
        );

        let response = match response_rx.await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(e),
            // sender dropped without a verdict
            Err(_) => return Err(ClientError::ConnectionLost),
        };

        if let Some(error) = response.error {
            return Err(ClientError::RemoteRpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Read frames off the socket and route them to their callers
fn spawn_reader(shared: Arc<TransportShared>, read_half: OwnedReadHalf) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let response: RpcResponse = match serde_json::from_str(line) {
                        Ok(response) => response,
                        Err(e) => {
                            warn!("discarding unparseable frame: {}", e);
                            continue;
                        }
                    };
                    let pending = shared.pending.lock().await.remove(&response.id);
                    match pending {
                        // send fails if the caller gave up; the entry is
                        // already removed either way
                        Some(tx) => {
                            let _ = tx.send(Ok(response));
                        }
                        None => warn!(
                            id = response.id,
                            "protocol violation: response matches no outstanding call"
                        ),
                    }
                }
                Ok(None) => {
                    mark_disconnected(&shared, "connection closed by node").await;
                    break;
                }
                Err(e) => {
                    mark_disconnected(&shared, &format!("read error: {}", e)).await;
                    break;
                }
            }
        }
        debug!("reader task terminated");
    });
}

/// Enforce a call's deadline independently of its caller
fn spawn_deadline(shared: Arc<TransportShared>, id: u64, method: String, deadline: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        if let Some(tx) = shared.pending.lock().await.remove(&id) {
            warn!(id, method, "rpc call timed out");
            let _ = tx.send(Err(ClientError::RpcTimeout));
        }
    });
}

/// Drain queued frames onto the socket, one writer per connection
fn spawn_writer(
    shared: Arc<TransportShared>,
    mut write_half: OwnedWriteHalf,
    mut writer_rx: mpsc::UnboundedReceiver<String>,
) {
    tokio::spawn(async move {
        while let Some(frame) = writer_rx.recv().await {
            let result = async {
                write_half.write_all(frame.as_bytes()).await?;
                write_half.flush().await
            }
            .await;
            if let Err(e) = result {
                mark_disconnected(&shared, &format!("write error: {}", e)).await;
                break;
            }
        }
        debug!("writer task terminated");
    });
}

/// Transition to `Disconnected` and fail every outstanding call
async fn mark_disconnected(shared: &Arc<TransportShared>, reason: &str) {
    {
        let mut state = shared.state.lock().await;
        if matches!(*state, ConnectionState::Disconnected { .. }) {
            return;
        }
        *state = ConnectionState::Disconnected {
            reason: reason.to_string(),
        };
    }
    *shared.writer_tx.lock().await = None;

    let mut pending = shared.pending.lock().await;
    let dropped = pending.len();
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(ClientError::ConnectionLost));
    }
    if dropped > 0 {
        warn!(
            "transport disconnected ({}), {} outstanding calls failed",
            reason, dropped
        );
    } else {
        warn!("transport disconnected: {}", reason);
    }
}
