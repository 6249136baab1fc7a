//! Client session: outbound requests, inbound routing.
//!
//! The session owns no socket. Callers send the wire text returned by
//! `request` over their transport and feed every received frame to
//! `handle_frame`. Results go to the matching `PendingResult`, updates go
//! to the dispatcher.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio::time::Duration;

use relaywire_core::error::{RelayError, Result};
use relaywire_core::protocol::client::{SubscribeParams, UnsubscribeParams};
use relaywire_core::protocol::{ClientMessage, ClientRequest, ServerResultMessage};

use crate::codec::{self, Inbound};
use crate::config::SessionSection;
use crate::correlation::{Completion, PendingRequests};
use crate::dispatch::Dispatcher;

/// How an inbound frame was routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Response(Completion),
    Update(&'static str),
}

/// Waiter for the result of one request.
///
/// Dropping it, waited on or not, removes the request from the pending table.
pub struct PendingResult {
    id: String,
    rx: oneshot::Receiver<ServerResultMessage>,
    timeout: Duration,
    pending: Arc<PendingRequests>,
}

impl PendingResult {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the result, bounded by `session.request_timeout_ms`.
    pub async fn wait(mut self) -> Result<ServerResultMessage> {
        match tokio::time::timeout(self.timeout, &mut self.rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(RelayError::Internal(format!("request {} was cancelled", self.id))),
            Err(_) => {
                tracing::warn!(id = %self.id, "request timed out");
                Err(RelayError::Timeout)
            }
        }
    }
}

impl Drop for PendingResult {
    fn drop(&mut self) {
        if self.pending.cancel(&self.id) {
            tracing::debug!(id = %self.id, "request dropped while pending");
        }
    }
}

pub struct Session {
    cfg: SessionSection,
    pending: Arc<PendingRequests>,
    dispatcher: Arc<Dispatcher>,
}

impl Session {
    pub fn new(cfg: SessionSection, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            cfg,
            pending: Arc::new(PendingRequests::new()),
            dispatcher,
        }
    }

    /// Assign an id, encode, and start waiting. Returns the wire text.
    pub fn request(&self, message: impl Into<ClientMessage>) -> Result<(String, PendingResult)> {
        let req = ClientRequest::new(message, self.pending.next_id());
        let wire = codec::encode(&req)?;
        let rx = self.pending.register(req.id.clone())?;

        tracing::info!(id = %req.id, method = req.method().as_str(), "request issued");

        Ok((
            wire,
            PendingResult {
                id: req.id,
                rx,
                timeout: Duration::from_millis(self.cfg.request_timeout_ms),
                pending: Arc::clone(&self.pending),
            },
        ))
    }

    pub fn subscribe(&self, chain_ids: Vec<String>) -> Result<(String, PendingResult)> {
        self.request(SubscribeParams { chain_ids })
    }

    pub fn unsubscribe(&self, chain_ids: Vec<String>) -> Result<(String, PendingResult)> {
        self.request(UnsubscribeParams { chain_ids })
    }

    /// Route one inbound frame.
    pub async fn handle_frame(&self, frame: Bytes) -> Result<Handled> {
        match codec::decode(frame, self.cfg.max_frame_bytes)? {
            Inbound::Response(resp) => Ok(Handled::Response(self.pending.complete(resp))),
            Inbound::Update(update) => {
                let kind = update.kind();
                self.dispatcher.dispatch(update).await?;
                Ok(Handled::Update(kind))
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn config(&self) -> &SessionSection {
        &self.cfg
    }
}
