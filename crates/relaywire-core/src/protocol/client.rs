//! Client -> server messages.
//!
//! Wire form of a request:
//! `{"method": "<method>", "params": {...}, "id": "<correlation id>"}`
//!
//! The params shape is fixed by the concrete `Call<P>` type, never looked up
//! from the method string at runtime. `method` only has to agree with it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};
use crate::protocol::model::{check_amount, OpportunityBid};
use crate::protocol::oneof::{resolve, strict, OneOf, Variant};

/// Closed set of client methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Subscribe,
    Unsubscribe,
    SubmitBid,
    PostOpportunityBid,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Subscribe => "subscribe",
            Method::Unsubscribe => "unsubscribe",
            Method::SubmitBid => "submit_bid",
            Method::PostOpportunityBid => "post_opportunity_bid",
        }
    }
}

/// Variant-specific parameter payload.
pub trait Params: Sized + Serialize + DeserializeOwned {
    /// The only method this payload may travel under.
    const METHOD: Method;

    /// Checks beyond what the serde schema expresses.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// The payload's own mapping form.
    fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| RelayError::Internal(format!("params encode failed: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeParams {
    pub chain_ids: Vec<String>,
}

impl Params for SubscribeParams {
    const METHOD: Method = Method::Subscribe;

    fn validate(&self) -> std::result::Result<(), String> {
        check_chain_ids(&self.chain_ids)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnsubscribeParams {
    pub chain_ids: Vec<String>,
}

impl Params for UnsubscribeParams {
    const METHOD: Method = Method::Unsubscribe;

    fn validate(&self) -> std::result::Result<(), String> {
        check_chain_ids(&self.chain_ids)
    }
}

/// Raw bid on a permission key. Only `amount` is mandatory; unset fields
/// are left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BidParams {
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calldata: Option<String>,
}

impl BidParams {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Self::default()
        }
    }
}

impl Params for BidParams {
    const METHOD: Method = Method::SubmitBid;

    fn validate(&self) -> std::result::Result<(), String> {
        check_amount("amount", &self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpportunityBidParams {
    pub opportunity_id: String,
    pub opportunity_bid: OpportunityBid,
}

impl Params for OpportunityBidParams {
    const METHOD: Method = Method::PostOpportunityBid;

    fn validate(&self) -> std::result::Result<(), String> {
        if self.opportunity_id.is_empty() {
            return Err("`opportunity_id` must not be empty".into());
        }
        check_amount("opportunity_bid.amount", &self.opportunity_bid.amount)?;
        check_amount("opportunity_bid.valid_until", &self.opportunity_bid.valid_until)
    }
}

fn check_chain_ids(ids: &[String]) -> std::result::Result<(), String> {
    if ids.is_empty() {
        return Err("`chain_ids` must not be empty".into());
    }
    if ids.iter().any(String::is_empty) {
        return Err("`chain_ids` must not contain empty ids".into());
    }
    Ok(())
}

/// One method call: the method is implied by `P`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<P> {
    pub params: P,
}

impl<P: Params> Call<P> {
    pub fn new(params: P) -> Self {
        Self { params }
    }

    pub fn method(&self) -> Method {
        P::METHOD
    }

    /// Strict validator: known keys only, matching method, valid params.
    pub fn parse_value(raw: &Value) -> std::result::Result<Self, String> {
        let obj = raw.as_object().ok_or("expected a json object")?;
        if let Some(k) = obj.keys().find(|k| !matches!(k.as_str(), "method" | "params")) {
            return Err(format!("unknown field `{k}`"));
        }

        let method: Method = strict(obj.get("method").ok_or("missing field `method`")?)?;
        if method != P::METHOD {
            return Err(format!(
                "`method` must be `{}`, got `{}`",
                P::METHOD.as_str(),
                method.as_str()
            ));
        }

        let params: P = strict(obj.get("params").ok_or("missing field `params`")?)
            .map_err(|e| format!("params: {e}"))?;
        params.validate().map_err(|e| format!("params: {e}"))?;

        Ok(Self { params })
    }

    /// Parent serializer; the nested params serializer is called explicitly.
    pub fn to_value(&self) -> Result<Value> {
        let mut obj = Map::new();
        obj.insert("method".into(), Value::String(P::METHOD.as_str().into()));
        obj.insert("params".into(), self.params.to_value()?);
        Ok(Value::Object(obj))
    }
}

/// Every message a client may send (without the correlation id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Subscribe(Call<SubscribeParams>),
    Unsubscribe(Call<UnsubscribeParams>),
    SubmitBid(Call<BidParams>),
    PostOpportunityBid(Call<OpportunityBidParams>),
}

impl ClientMessage {
    pub fn method(&self) -> Method {
        match self {
            ClientMessage::Subscribe(c) => c.method(),
            ClientMessage::Unsubscribe(c) => c.method(),
            ClientMessage::SubmitBid(c) => c.method(),
            ClientMessage::PostOpportunityBid(c) => c.method(),
        }
    }
}

fn parse_subscribe(raw: &Value) -> std::result::Result<ClientMessage, String> {
    Call::parse_value(raw).map(ClientMessage::Subscribe)
}

fn parse_unsubscribe(raw: &Value) -> std::result::Result<ClientMessage, String> {
    Call::parse_value(raw).map(ClientMessage::Unsubscribe)
}

fn parse_submit_bid(raw: &Value) -> std::result::Result<ClientMessage, String> {
    Call::parse_value(raw).map(ClientMessage::SubmitBid)
}

fn parse_post_opportunity_bid(raw: &Value) -> std::result::Result<ClientMessage, String> {
    Call::parse_value(raw).map(ClientMessage::PostOpportunityBid)
}

const CLIENT_MESSAGE_VARIANTS: &[Variant<ClientMessage>] = &[
    Variant {
        name: "Subscribe",
        parse: parse_subscribe,
    },
    Variant {
        name: "Unsubscribe",
        parse: parse_unsubscribe,
    },
    Variant {
        name: "SubmitBid",
        parse: parse_submit_bid,
    },
    Variant {
        name: "PostOpportunityBid",
        parse: parse_post_opportunity_bid,
    },
];

impl OneOf for ClientMessage {
    const NAME: &'static str = "ClientMessage";

    fn variants() -> &'static [Variant<Self>] {
        CLIENT_MESSAGE_VARIANTS
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ClientMessage::Subscribe(_) => "Subscribe",
            ClientMessage::Unsubscribe(_) => "Unsubscribe",
            ClientMessage::SubmitBid(_) => "SubmitBid",
            ClientMessage::PostOpportunityBid(_) => "PostOpportunityBid",
        }
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            ClientMessage::Subscribe(c) => c.to_value(),
            ClientMessage::Unsubscribe(c) => c.to_value(),
            ClientMessage::SubmitBid(c) => c.to_value(),
            ClientMessage::PostOpportunityBid(c) => c.to_value(),
        }
    }
}

impl From<SubscribeParams> for ClientMessage {
    fn from(p: SubscribeParams) -> Self {
        ClientMessage::Subscribe(Call::new(p))
    }
}

impl From<UnsubscribeParams> for ClientMessage {
    fn from(p: UnsubscribeParams) -> Self {
        ClientMessage::Unsubscribe(Call::new(p))
    }
}

impl From<BidParams> for ClientMessage {
    fn from(p: BidParams) -> Self {
        ClientMessage::SubmitBid(Call::new(p))
    }
}

impl From<OpportunityBidParams> for ClientMessage {
    fn from(p: OpportunityBidParams) -> Self {
        ClientMessage::PostOpportunityBid(Call::new(p))
    }
}

/// A client message plus its correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    pub message: ClientMessage,
    /// Opaque; echoed back unchanged in the matching result.
    pub id: String,
}

impl ClientRequest {
    pub fn new(message: impl Into<ClientMessage>, id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: id.into(),
        }
    }

    pub fn method(&self) -> Method {
        self.message.method()
    }

    pub fn parse(s: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(s)
            .map_err(|e| RelayError::BadRequest(format!("invalid request json: {e}")))?;
        Self::from_value(&raw)
    }

    pub fn from_value(raw: &Value) -> Result<Self> {
        let Value::Object(obj) = raw else {
            return Err(RelayError::BadRequest("client request must be a json object".into()));
        };

        let mut rest = obj.clone();
        let id = match rest.remove("id") {
            Some(Value::String(id)) => id,
            Some(other) => {
                return Err(RelayError::BadRequest(format!("`id` must be a string, got {other}")))
            }
            None => return Err(RelayError::BadRequest("missing field `id`".into())),
        };

        let message = resolve::<ClientMessage>(&Value::Object(rest))?;
        Ok(Self { message, id })
    }

    /// Exactly `method`, `params` and `id`.
    pub fn to_value(&self) -> Result<Value> {
        let mut v = self.message.to_value()?;
        match &mut v {
            Value::Object(obj) => {
                obj.insert("id".into(), Value::String(self.id.clone()));
                Ok(v)
            }
            _ => Err(RelayError::Internal("client message must encode as an object".into())),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let v = self.to_value()?;
        serde_json::to_string(&v)
            .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
    }
}
