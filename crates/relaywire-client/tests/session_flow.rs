//! Session routing: results to waiters, updates to handlers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;

use relaywire_client::config;
use relaywire_client::correlation::{Completion, PendingRequests};
use relaywire_client::dispatch::Dispatcher;
use relaywire_client::handlers::{BidStatusLog, OpportunityLog};
use relaywire_client::session::{Handled, Session};
use relaywire_core::protocol::client::BidParams;
use relaywire_core::protocol::{ClientRequest, ServerResultMessage, ServerResultResponse};

fn session_with(yaml: &str) -> (Session, Arc<OpportunityLog>, Arc<BidStatusLog>) {
    let cfg = config::load_from_str(yaml).unwrap();
    let opportunities = Arc::new(OpportunityLog::new());
    let bids = Arc::new(BidStatusLog::new());
    let dispatcher = Arc::new(Dispatcher::new());
    dispatcher.register(opportunities.clone());
    dispatcher.register(bids.clone());
    (Session::new(cfg.session, dispatcher), opportunities, bids)
}

fn session() -> (Session, Arc<OpportunityLog>, Arc<BidStatusLog>) {
    session_with("version: 1\n")
}

fn frame(v: serde_json::Value) -> Bytes {
    Bytes::from(v.to_string())
}

#[tokio::test]
async fn result_reaches_its_request() {
    let (session, _, _) = session();
    let (wire, pending) = session.request(BidParams::new("100")).unwrap();

    let req = ClientRequest::parse(&wire).unwrap();
    assert_eq!(req.id, pending.id());
    assert_eq!(session.pending_count(), 1);

    let handled = session
        .handle_frame(frame(json!({"status": "success", "result": "bid-1", "id": req.id})))
        .await
        .unwrap();
    assert_eq!(handled, Handled::Response(Completion::Delivered));

    let result = pending.wait().await.unwrap();
    assert_eq!(result, ServerResultMessage::success(Some(json!("bid-1"))));
    assert_eq!(session.pending_count(), 0);
}

#[tokio::test]
async fn request_ids_are_distinct() {
    let (session, _, _) = session();
    let (_, a) = session.subscribe(vec!["sepolia".into()]).unwrap();
    let (_, b) = session.unsubscribe(vec!["sepolia".into()]).unwrap();
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn unknown_and_missing_ids_are_not_delivered() {
    let (session, _, _) = session();

    let handled = session
        .handle_frame(frame(json!({"status": "error", "result": "nope", "id": "req-99"})))
        .await
        .unwrap();
    assert_eq!(handled, Handled::Response(Completion::Unknown("req-99".into())));

    let handled = session
        .handle_frame(frame(json!({"status": "error", "result": "Invalid request", "id": null})))
        .await
        .unwrap();
    assert_eq!(handled, Handled::Response(Completion::Uncorrelated));
}

#[tokio::test]
async fn updates_are_dispatched_by_kind() {
    let (session, opportunities, bids) = session();

    let opportunity = json!({
        "type": "new_opportunity",
        "opportunity": {
            "version": "v1",
            "chain_id": "sepolia",
            "contract": "0xcA11bde05977b3631167028862bE2a173976CA11",
            "calldata": "0xdeadbeef",
            "permission_key": "0xdeadbeefcafe",
            "value": "1",
            "repay_tokens": [],
            "receipt_tokens": [],
            "opportunity_id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
            "creation_time": 1700000000
        }
    });
    let handled = session.handle_frame(frame(opportunity)).await.unwrap();
    assert_eq!(handled, Handled::Update("new_opportunity"));

    let status = json!({
        "type": "bid_status_update",
        "status": { "id": "bid-1", "bid_status": { "type": "lost" } }
    });
    let handled = session.handle_frame(frame(status)).await.unwrap();
    assert_eq!(handled, Handled::Update("bid_status_update"));

    assert_eq!(opportunities.seen(), 1);
    assert_eq!(bids.seen(), 1);
}

#[tokio::test]
async fn update_without_handler_is_rejected() {
    let cfg = config::load_from_str("version: 1\n").unwrap();
    let session = Session::new(cfg.session, Arc::new(Dispatcher::new()));

    let status = json!({
        "type": "bid_status_update",
        "status": { "id": "bid-1", "bid_status": { "type": "pending" } }
    });
    let err = session.handle_frame(frame(status)).await.unwrap_err();
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_frames_are_rejected() {
    let (session, _, _) = session_with("version: 1\nsession:\n  max_frame_bytes: 1024\n");

    let err = session.handle_frame(Bytes::from(vec![b' '; 2048])).await.unwrap_err();
    assert_eq!(err.code().as_str(), "PAYLOAD_TOO_LARGE");

    let err = session.handle_frame(Bytes::from_static(&[0xff, 0xfe])).await.unwrap_err();
    assert_eq!(err.code().as_str(), "BAD_REQUEST");

    let err = session
        .handle_frame(frame(json!({"status": "maybe", "id": "req-1"})))
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "NO_MATCH");
    assert_eq!(err.failures().len(), 2);

    let err = session.handle_frame(Bytes::from_static(b"null")).await.unwrap_err();
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[tokio::test]
async fn unanswered_request_times_out() {
    let (session, _, _) = session_with("version: 1\nsession:\n  request_timeout_ms: 100\n");
    let (_, pending) = session.subscribe(vec!["sepolia".into()]).unwrap();

    let err = pending.wait().await.unwrap_err();
    assert_eq!(err.code().as_str(), "TIMEOUT");
    assert_eq!(session.pending_count(), 0);
}

#[tokio::test]
async fn dropped_waiters_leave_nothing_pending() {
    let (session, _, _) = session();
    for _ in 0..100 {
        let (_, pending) = session.request(BidParams::new("1")).unwrap();
        drop(pending);
    }
    assert_eq!(session.pending_count(), 0);

    let (_, kept) = session.request(BidParams::new("1")).unwrap();
    assert_eq!(session.pending_count(), 1);
    drop(kept);
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn duplicate_ids_cannot_be_registered() {
    let pending = PendingRequests::new();
    let _rx = pending.register("a".into()).unwrap();
    let err = pending.register("a".into()).unwrap_err();
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
    assert_eq!(pending.len(), 1);
}

#[test]
fn dropped_waiter_is_abandoned() {
    let pending = PendingRequests::new();
    let rx = pending.register("a".into()).unwrap();
    drop(rx);

    let done = pending.complete(ServerResultResponse {
        result: ServerResultMessage::success(None),
        id: Some("a".into()),
    });
    assert_eq!(done, Completion::Abandoned);
    assert!(pending.is_empty());
}
