//! relaywire-replay
//!
//! Replays a captured server transcript (one JSON frame per line) through a
//! session and logs how every frame was routed.
//!
//! Usage: `relaywire-replay [config.yaml] <transcript.jsonl>`

use std::sync::Arc;

use bytes::Bytes;
use tracing_subscriber::{fmt, EnvFilter};

use relaywire_client::config::{self, ClientConfig};
use relaywire_client::correlation::Completion;
use relaywire_client::dispatch::Dispatcher;
use relaywire_client::handlers::{BidStatusLog, OpportunityLog};
use relaywire_client::session::{Handled, Session};
use relaywire_core::error::{RelayError, Result};

#[derive(Debug, Default)]
struct Summary {
    delivered: u64,
    abandoned: u64,
    unmatched: u64,
    updates: u64,
    rejected: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (cfg, transcript) = match args.as_slice() {
        [transcript] => (ClientConfig::default(), transcript.clone()),
        [cfg_path, transcript] => (config::load_from_file(cfg_path)?, transcript.clone()),
        _ => {
            return Err(RelayError::BadRequest(
                "usage: relaywire-replay [config.yaml] <transcript.jsonl>".into(),
            ))
        }
    };

    let dispatcher = Arc::new(Dispatcher::new());
    dispatcher.register(Arc::new(OpportunityLog::new()));
    dispatcher.register(Arc::new(BidStatusLog::new()));

    let session = Session::new(cfg.session.clone(), dispatcher);

    // First request of a session is always `req-1`.
    let _subscription = if cfg.session.chain_ids.is_empty() {
        None
    } else {
        let (wire, pending) = session.subscribe(cfg.session.chain_ids.clone())?;
        tracing::info!(%wire, "subscribe request");
        Some(pending)
    };

    let text = tokio::fs::read_to_string(&transcript)
        .await
        .map_err(|e| RelayError::Internal(format!("read transcript failed: {e}")))?;

    tracing::info!(%transcript, "replay starting");

    let mut summary = Summary::default();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match session.handle_frame(Bytes::copy_from_slice(line.as_bytes())).await {
            Ok(Handled::Response(Completion::Delivered)) => summary.delivered += 1,
            Ok(Handled::Response(Completion::Abandoned)) => summary.abandoned += 1,
            Ok(Handled::Response(_)) => summary.unmatched += 1,
            Ok(Handled::Update(_)) => summary.updates += 1,
            Err(e) => {
                summary.rejected += 1;
                tracing::warn!(
                    line = idx + 1,
                    code = e.code().as_str(),
                    error = %e,
                    "frame rejected"
                );
            }
        }
    }

    tracing::info!(
        delivered = summary.delivered,
        abandoned = summary.abandoned,
        unmatched = summary.unmatched,
        updates = summary.updates,
        rejected = summary.rejected,
        pending = session.pending_count(),
        "replay finished"
    );

    Ok(())
}
