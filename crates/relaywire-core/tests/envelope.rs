//! Envelope construction, exclusivity, and serialization.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use relaywire_core::error::{RelayError, Result};
use relaywire_core::protocol::client::{BidParams, SubscribeParams};
use relaywire_core::protocol::{
    ClientMessage, Envelope, OneOf, ServerMessage, ServerResultMessage, Variant,
};

// Two schemas that overlap on purpose: an object with both keys fits both.
#[derive(Debug, Clone, PartialEq)]
enum Overlapping {
    Named(String),
    Kinded(String),
}

fn by_name(raw: &Value) -> std::result::Result<Overlapping, String> {
    raw.get("name")
        .and_then(Value::as_str)
        .map(|s| Overlapping::Named(s.into()))
        .ok_or_else(|| "missing `name`".into())
}

fn by_kind(raw: &Value) -> std::result::Result<Overlapping, String> {
    raw.get("kind")
        .and_then(Value::as_str)
        .map(|s| Overlapping::Kinded(s.into()))
        .ok_or_else(|| "missing `kind`".into())
}

const OVERLAPPING: &[Variant<Overlapping>] = &[
    Variant {
        name: "ByName",
        parse: by_name,
    },
    Variant {
        name: "ByKind",
        parse: by_kind,
    },
];

impl OneOf for Overlapping {
    const NAME: &'static str = "Overlapping";

    fn variants() -> &'static [Variant<Self>] {
        OVERLAPPING
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Overlapping::Named(_) => "ByName",
            Overlapping::Kinded(_) => "ByKind",
        }
    }

    fn to_value(&self) -> Result<Value> {
        Ok(match self {
            Overlapping::Named(n) => json!({ "name": n }),
            Overlapping::Kinded(k) => json!({ "kind": k }),
        })
    }
}

#[test]
fn overlapping_schemas_are_ambiguous() {
    let err = Envelope::<Overlapping>::parse(r#"{"name":"a","kind":"b"}"#).unwrap_err();
    assert_eq!(err.code().as_str(), "AMBIGUOUS_VARIANT");
    match err {
        RelayError::AmbiguousVariant { target, matched } => {
            assert_eq!(target, "Overlapping");
            assert_eq!(matched, ["ByName", "ByKind"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn overlapping_schemas_resolve_when_only_one_fits() {
    let env = Envelope::<Overlapping>::parse(r#"{"kind":"b"}"#).unwrap();
    assert_eq!(env.inner(), Some(&Overlapping::Kinded("b".into())));
    assert_eq!(env.variant_name(), Some("ByKind"));
}

#[test]
fn wrap_accepts_a_matching_instance() {
    let call = json!({ "method": "subscribe", "params": { "chain_ids": ["sepolia"] } });
    let env = Envelope::<ClientMessage>::wrap(&call).unwrap();
    assert_eq!(
        env.inner(),
        Some(&ClientMessage::from(SubscribeParams {
            chain_ids: vec!["sepolia".into()]
        }))
    );
}

#[derive(Serialize)]
struct Unrelated {
    name: String,
    size: u32,
}

#[test]
fn wrap_rejects_an_unrelated_instance() {
    let res = Envelope::<ClientMessage>::wrap(&Unrelated {
        name: "x".into(),
        size: 1,
    });
    let err = res.unwrap_err();
    assert_eq!(err.code().as_str(), "NO_MATCH");
    assert_eq!(err.failures().len(), ClientMessage::variants().len());
}

#[test]
fn wrap_rejects_unserializable_instance() {
    let mut bad = BTreeMap::new();
    bad.insert(vec![1u8, 2], 3u8);
    let err = Envelope::<ClientMessage>::wrap(&bad).unwrap_err();
    assert_eq!(err.code().as_str(), "CONSTRUCTION_ARGUMENT");
}

#[test]
fn build_from_fields() {
    let env = Envelope::<ServerResultMessage>::build([
        ("status", json!("error")),
        ("result", json!("bid amount too low")),
    ])
    .unwrap();
    assert_eq!(env.inner(), Some(&ServerResultMessage::error("bid amount too low")));
}

#[test]
fn build_rejects_duplicate_and_empty_fields() {
    let err = Envelope::<ServerResultMessage>::build([
        ("status", json!("success")),
        ("status", json!("error")),
    ])
    .unwrap_err();
    assert_eq!(err.code().as_str(), "CONSTRUCTION_ARGUMENT");

    let err = Envelope::<ServerResultMessage>::build(Vec::<(String, Value)>::new()).unwrap_err();
    assert_eq!(err.code().as_str(), "CONSTRUCTION_ARGUMENT");
}

#[test]
fn unresolved_envelope_serializes_to_null() {
    let env = Envelope::<ClientMessage>::empty();
    assert!(!env.is_resolved());
    assert_eq!(env.variant_name(), None);
    assert_eq!(env.to_json().unwrap(), "null");
    assert_eq!(env.to_value().unwrap(), Value::Null);
}

#[test]
fn null_parses_to_the_unresolved_envelope() {
    let env = Envelope::<ServerMessage>::parse("null").unwrap();
    assert!(!env.is_resolved());

    let via_serde: Envelope<ServerMessage> = serde_json::from_str("null").unwrap();
    assert_eq!(env, via_serde);
    assert_eq!(env.to_json().unwrap(), "null");
}

#[test]
fn typed_constructor_serializes_through_variant() {
    let msg = ClientMessage::from(BidParams::new("100"));
    let env = Envelope::new(msg.clone());
    assert_eq!(env.to_value().unwrap(), msg.to_value().unwrap());
    assert_eq!(
        env.to_value().unwrap(),
        json!({ "method": "submit_bid", "params": { "amount": "100" } })
    );
}

#[test]
fn envelope_embeds_in_serde_structs() {
    #[derive(Debug, Serialize, Deserialize)]
    struct Logged {
        seq: u64,
        result: Envelope<ServerResultMessage>,
    }

    let logged: Logged =
        serde_json::from_str(r#"{"seq":7,"result":{"status":"success","result":{"bid_id":"b1"}}}"#)
            .unwrap();
    assert_eq!(logged.result.variant_name(), Some("ResultSuccess"));

    let back = serde_json::to_value(&logged).unwrap();
    assert_eq!(back["result"]["result"]["bid_id"], "b1");

    let bad = serde_json::from_str::<Logged>(r#"{"seq":7,"result":{"status":"maybe"}}"#);
    assert!(bad.is_err());

    let empty: Logged = serde_json::from_str(r#"{"seq":8,"result":null}"#).unwrap();
    assert!(!empty.result.is_resolved());
}
