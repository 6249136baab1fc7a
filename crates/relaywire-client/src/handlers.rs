//! Built-in update handlers that record what they see.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use relaywire_core::error::{RelayError, Result};
use relaywire_core::protocol::ServerUpdateResponse;

use crate::dispatch::UpdateHandler;

#[derive(Default)]
pub struct OpportunityLog {
    seen: AtomicU64,
}

impl OpportunityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UpdateHandler for OpportunityLog {
    fn kind(&self) -> &'static str {
        "new_opportunity"
    }

    async fn handle(&self, update: ServerUpdateResponse) -> Result<()> {
        match update {
            ServerUpdateResponse::NewOpportunity { opportunity } => {
                self.seen.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    opportunity_id = %opportunity.opportunity_id,
                    chain_id = %opportunity.chain_id,
                    repay = opportunity.repay_tokens.len(),
                    receipt = opportunity.receipt_tokens.len(),
                    "new opportunity"
                );
                Ok(())
            }
            other => Err(RelayError::Internal(format!(
                "opportunity log got {} update",
                other.kind()
            ))),
        }
    }
}

#[derive(Default)]
pub struct BidStatusLog {
    seen: AtomicU64,
}

impl BidStatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UpdateHandler for BidStatusLog {
    fn kind(&self) -> &'static str {
        "bid_status_update"
    }

    async fn handle(&self, update: ServerUpdateResponse) -> Result<()> {
        match update {
            ServerUpdateResponse::BidStatusUpdate { status } => {
                self.seen.fetch_add(1, Ordering::Relaxed);
                tracing::info!(bid_id = %status.id, state = ?status.bid_status, "bid status");
                Ok(())
            }
            other => Err(RelayError::Internal(format!(
                "bid status log got {} update",
                other.kind()
            ))),
        }
    }
}
