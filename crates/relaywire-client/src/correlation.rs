//! Pending request table: correlation id -> waiter.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;

use relaywire_core::error::{RelayError, Result};
use relaywire_core::protocol::{ServerResultMessage, ServerResultResponse};

/// What happened to an inbound result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Handed to the waiting caller.
    Delivered,
    /// Matched a request whose caller stopped waiting.
    Abandoned,
    /// No request with this id is in flight.
    Unknown(String),
    /// Result without an id (server could not read the request).
    Uncorrelated,
}

pub struct PendingRequests {
    pending: DashMap<String, oneshot::Sender<ServerResultMessage>>,
    seq: AtomicU64,
}

impl Default for PendingRequests {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingRequests {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Fresh correlation id, unique for this table.
    pub fn next_id(&self) -> String {
        format!("req-{}", self.seq.fetch_add(1, Ordering::Relaxed))
    }

    pub fn register(&self, id: String) -> Result<oneshot::Receiver<ServerResultMessage>> {
        match self.pending.entry(id) {
            Entry::Occupied(e) => Err(RelayError::BadRequest(format!(
                "request id already in flight: {}",
                e.key()
            ))),
            Entry::Vacant(e) => {
                let (tx, rx) = oneshot::channel();
                e.insert(tx);
                Ok(rx)
            }
        }
    }

    pub fn complete(&self, resp: ServerResultResponse) -> Completion {
        let Some(id) = resp.id else {
            tracing::warn!(result = ?resp.result, "result without request id");
            return Completion::Uncorrelated;
        };

        match self.pending.remove(&id) {
            Some((_, tx)) => {
                if tx.send(resp.result).is_err() {
                    tracing::debug!(%id, "waiter gone before result arrived");
                    return Completion::Abandoned;
                }
                Completion::Delivered
            }
            None => {
                tracing::warn!(%id, "result for unknown request id");
                Completion::Unknown(id)
            }
        }
    }

    /// Forget a request; its waiter sees a closed channel.
    pub fn cancel(&self, id: &str) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
