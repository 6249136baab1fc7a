//! Server -> client messages.
//!
//! Nothing the server sends carries a single type tag shared by all
//! messages. Results are recognised by `status`, updates by `type`, and the
//! top-level `ServerMessage` union relies on exclusivity matching to tell
//! them apart.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};
use crate::protocol::model::{BidStatus, OpportunityParamsWithMetadata};
use crate::protocol::oneof::{expect_tag, resolve, strict, OneOf, Variant};

/// Accept `raw` as `T` once the `field == tag` marker is stripped.
fn parse_tagged<T: DeserializeOwned>(
    raw: &Value,
    field: &str,
    tag: &str,
) -> std::result::Result<T, String> {
    let obj = raw.as_object().ok_or("expected a json object")?;
    expect_tag(raw, field, tag)?;
    let mut rest = obj.clone();
    rest.remove(field);
    strict(&Value::Object(rest))
}

/// Serialize `value` and add the `field: tag` marker.
fn encode_tagged<T: Serialize>(value: &T, field: &str, tag: &str) -> Result<Value> {
    let v = serde_json::to_value(value)
        .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))?;
    let Value::Object(body) = v else {
        return Err(RelayError::Internal(format!("`{tag}` body must encode as an object")));
    };
    let mut obj = Map::new();
    obj.insert(field.into(), Value::String(tag.into()));
    obj.extend(body);
    Ok(Value::Object(obj))
}

// --------------------
// Results
// --------------------

/// `{"status": "success", "result"?: ...}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultSuccess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// `{"status": "error", "result": "<reason>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultError {
    pub result: String,
}

/// Outcome of one client request.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerResultMessage {
    Success(ResultSuccess),
    Error(ResultError),
}

impl ServerResultMessage {
    pub fn success(result: Option<Value>) -> Self {
        ServerResultMessage::Success(ResultSuccess { result })
    }

    pub fn error(reason: impl Into<String>) -> Self {
        ServerResultMessage::Error(ResultError {
            result: reason.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServerResultMessage::Success(_))
    }
}

fn parse_success(raw: &Value) -> std::result::Result<ServerResultMessage, String> {
    parse_tagged(raw, "status", "success").map(ServerResultMessage::Success)
}

fn parse_error(raw: &Value) -> std::result::Result<ServerResultMessage, String> {
    parse_tagged(raw, "status", "error").map(ServerResultMessage::Error)
}

const RESULT_VARIANTS: &[Variant<ServerResultMessage>] = &[
    Variant {
        name: "ResultSuccess",
        parse: parse_success,
    },
    Variant {
        name: "ResultError",
        parse: parse_error,
    },
];

impl OneOf for ServerResultMessage {
    const NAME: &'static str = "ServerResultMessage";

    fn variants() -> &'static [Variant<Self>] {
        RESULT_VARIANTS
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ServerResultMessage::Success(_) => "ResultSuccess",
            ServerResultMessage::Error(_) => "ResultError",
        }
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            ServerResultMessage::Success(s) => encode_tagged(s, "status", "success"),
            ServerResultMessage::Error(e) => encode_tagged(e, "status", "error"),
        }
    }
}

/// A result plus the id of the request it answers.
///
/// `id` is `None` only when the server could not read the request at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerResultResponse {
    pub result: ServerResultMessage,
    pub id: Option<String>,
}

impl ServerResultResponse {
    pub fn from_value(raw: &Value) -> Result<Self> {
        let Value::Object(obj) = raw else {
            return Err(RelayError::BadRequest("result response must be a json object".into()));
        };

        let mut rest = obj.clone();
        let id = match rest.remove("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => {
                return Err(RelayError::BadRequest(format!(
                    "`id` must be a string or null, got {other}"
                )))
            }
        };

        let result = resolve::<ServerResultMessage>(&Value::Object(rest))?;
        Ok(Self { result, id })
    }

    pub fn to_value(&self) -> Result<Value> {
        let mut v = self.result.to_value()?;
        if let (Value::Object(obj), Some(id)) = (&mut v, &self.id) {
            obj.insert("id".into(), Value::String(id.clone()));
        }
        Ok(v)
    }
}

// --------------------
// Updates
// --------------------

/// Subscription pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerUpdateResponse {
    NewOpportunity {
        opportunity: OpportunityParamsWithMetadata,
    },
    BidStatusUpdate {
        status: BidStatus,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NewOpportunityBody {
    opportunity: OpportunityParamsWithMetadata,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BidStatusBody {
    status: BidStatus,
}

impl ServerUpdateResponse {
    /// Value of the `type` marker, used to route updates.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerUpdateResponse::NewOpportunity { .. } => "new_opportunity",
            ServerUpdateResponse::BidStatusUpdate { .. } => "bid_status_update",
        }
    }
}

fn parse_new_opportunity(raw: &Value) -> std::result::Result<ServerUpdateResponse, String> {
    let body: NewOpportunityBody = parse_tagged(raw, "type", "new_opportunity")?;
    Ok(ServerUpdateResponse::NewOpportunity {
        opportunity: body.opportunity,
    })
}

fn parse_bid_status_update(raw: &Value) -> std::result::Result<ServerUpdateResponse, String> {
    let body: BidStatusBody = parse_tagged(raw, "type", "bid_status_update")?;
    Ok(ServerUpdateResponse::BidStatusUpdate { status: body.status })
}

const UPDATE_VARIANTS: &[Variant<ServerUpdateResponse>] = &[
    Variant {
        name: "NewOpportunity",
        parse: parse_new_opportunity,
    },
    Variant {
        name: "BidStatusUpdate",
        parse: parse_bid_status_update,
    },
];

impl OneOf for ServerUpdateResponse {
    const NAME: &'static str = "ServerUpdateResponse";

    fn variants() -> &'static [Variant<Self>] {
        UPDATE_VARIANTS
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ServerUpdateResponse::NewOpportunity { .. } => "NewOpportunity",
            ServerUpdateResponse::BidStatusUpdate { .. } => "BidStatusUpdate",
        }
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            ServerUpdateResponse::NewOpportunity { opportunity } => encode_tagged(
                &NewOpportunityBody {
                    opportunity: opportunity.clone(),
                },
                "type",
                self.kind(),
            ),
            ServerUpdateResponse::BidStatusUpdate { status } => encode_tagged(
                &BidStatusBody {
                    status: status.clone(),
                },
                "type",
                self.kind(),
            ),
        }
    }
}

// --------------------
// Everything the server sends
// --------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Response(ServerResultResponse),
    Update(ServerUpdateResponse),
}

fn parse_response(raw: &Value) -> std::result::Result<ServerMessage, String> {
    ServerResultResponse::from_value(raw)
        .map(ServerMessage::Response)
        .map_err(|e| e.to_string())
}

fn parse_update(raw: &Value) -> std::result::Result<ServerMessage, String> {
    resolve::<ServerUpdateResponse>(raw)
        .map(ServerMessage::Update)
        .map_err(|e| e.to_string())
}

const SERVER_MESSAGE_VARIANTS: &[Variant<ServerMessage>] = &[
    Variant {
        name: "ServerResultResponse",
        parse: parse_response,
    },
    Variant {
        name: "ServerUpdateResponse",
        parse: parse_update,
    },
];

impl OneOf for ServerMessage {
    const NAME: &'static str = "ServerMessage";

    fn variants() -> &'static [Variant<Self>] {
        SERVER_MESSAGE_VARIANTS
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ServerMessage::Response(_) => "ServerResultResponse",
            ServerMessage::Update(_) => "ServerUpdateResponse",
        }
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            ServerMessage::Response(r) => r.to_value(),
            ServerMessage::Update(u) => u.to_value(),
        }
    }
}
