//! Auction domain records carried inside client and server messages.
//!
//! Amounts travel as decimal strings (wei can exceed `u64`), so they are
//! checked for shape here but never converted.

use serde::{Deserialize, Serialize};

/// Token amount paired with its contract address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenQty {
    pub amount: String,
    pub contract: String,
}

/// Opportunity schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityVersion {
    V1,
}

/// Opportunity as broadcast to subscribers, including server metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpportunityParamsWithMetadata {
    pub version: OpportunityVersion,
    pub chain_id: String,
    pub contract: String,
    pub calldata: String,
    pub permission_key: String,
    pub value: String,
    pub repay_tokens: Vec<TokenQty>,
    pub receipt_tokens: Vec<TokenQty>,
    /// Server-assigned id (uuid text).
    pub opportunity_id: String,
    /// Unix seconds.
    pub creation_time: i64,
}

/// Signed bid on a specific opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpportunityBid {
    pub amount: String,
    pub executor: String,
    pub permission_key: String,
    pub signature: String,
    pub valid_until: String,
}

/// Lifecycle state of a submitted bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum BidState {
    Pending {},
    /// Included on chain; `result` is the transaction hash.
    Submitted { result: String },
    Lost {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
    },
}

/// Status report for one bid, keyed by the bid id returned on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BidStatus {
    pub id: String,
    pub bid_status: BidState,
}

/// Non-empty run of ASCII digits.
pub fn is_decimal_amount(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn check_amount(field: &str, s: &str) -> std::result::Result<(), String> {
    if is_decimal_amount(s) {
        Ok(())
    } else {
        Err(format!("`{field}` must be a decimal integer string, got `{s}`"))
    }
}
