//! Client-side transport seams and the persistent-channel correlator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::types::{McpError, McpResult, RequestId};

/// A single request/response exchange with no connection state.
///
/// `Ok(None)` means the server accepted the payload without a response
/// (notifications).
#[async_trait]
pub trait OneShotChannel: Send + Sync {
    async fn exchange(&self, payload: String) -> McpResult<Option<String>>;
}

/// Raw text frames flowing over an established duplex connection. The
/// connection is gone once `inbound` yields `None`.
pub struct DuplexLink {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Opens persistent duplex connections.
#[async_trait]
pub trait PersistentConnector: Send + Sync {
    async fn connect(&self) -> McpResult<DuplexLink>;
}

#[derive(Default)]
struct Pending {
    closed: bool,
    waiters: HashMap<RequestId, oneshot::Sender<Value>>,
}

/// Correlates responses on a persistent link with their requests by id.
/// Responses may arrive in any order.
pub struct PersistentChannel {
    outbound: mpsc::UnboundedSender<String>,
    pending: Arc<Mutex<Pending>>,
    reader: JoinHandle<()>,
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes its waiter entry when a request ends without a response,
/// including when the request future is dropped.
struct Waiter<'a> {
    pending: &'a Mutex<Pending>,
    id: Option<RequestId>,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            lock(self.pending).waiters.remove(&id);
        }
    }
}

impl PersistentChannel {
    /// Start correlating on `link`. `on_close` runs once when the link ends.
    pub fn open<F>(link: DuplexLink, on_close: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let DuplexLink {
            outbound,
            mut inbound,
        } = link;
        let pending = Arc::new(Mutex::new(Pending::default()));
        let shared = pending.clone();

        let reader = tokio::spawn(async move {
            while let Some(text) = inbound.recv().await {
                let value: Value = match serde_json::from_str(&text) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!("Discarding unparseable frame: {e}");
                        continue;
                    }
                };
                let id = value
                    .get("id")
                    .cloned()
                    .and_then(|id| serde_json::from_value::<RequestId>(id).ok())
                    .unwrap_or(RequestId::Null);

                let waiter = lock(&shared).waiters.remove(&id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(value);
                    }
                    None => tracing::debug!("No pending request for response id {id}"),
                }
            }

            let orphaned = {
                let mut pending = lock(&shared);
                pending.closed = true;
                std::mem::take(&mut pending.waiters)
            };
            tracing::info!("Persistent channel closed");
            on_close();
            // Dropping the senders wakes every waiter with ConnectionClosed.
            drop(orphaned);
        });

        Self {
            outbound,
            pending,
            reader,
        }
    }

    pub fn is_open(&self) -> bool {
        !lock(&self.pending).closed
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).waiters.len()
    }

    /// Send `payload` and wait for the response carrying `id`.
    pub async fn request(&self, id: RequestId, payload: String) -> McpResult<Value> {
        let rx = {
            let mut pending = lock(&self.pending);
            if pending.closed {
                return Err(McpError::ConnectionClosed);
            }
            let (tx, rx) = oneshot::channel();
            pending.waiters.insert(id.clone(), tx);
            rx
        };

        let mut waiter = Waiter {
            pending: &self.pending,
            id: Some(id),
        };
        if self.outbound.send(payload).is_err() {
            return Err(McpError::ConnectionClosed);
        }

        let response = rx.await.map_err(|_| McpError::ConnectionClosed);
        waiter.id = None;
        response
    }

    /// Fire-and-forget send.
    pub fn send(&self, payload: String) -> McpResult<()> {
        if !self.is_open() {
            return Err(McpError::ConnectionClosed);
        }
        self.outbound
            .send(payload)
            .map_err(|_| McpError::ConnectionClosed)
    }
}

impl Drop for PersistentChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
