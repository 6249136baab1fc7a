//! Shared error type across relaywire crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Input matched none of the registered variants.
    NoMatch,
    /// Input matched more than one registered variant.
    AmbiguousVariant,
    /// Malformed constructor call.
    ConstructionArgument,
    /// Invalid input / malformed message.
    BadRequest,
    /// Frame too large.
    PayloadTooLarge,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// No response arrived in time.
    Timeout,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoMatch => "NO_MATCH",
            ErrorCode::AmbiguousVariant => "AMBIGUOUS_VARIANT",
            ErrorCode::ConstructionArgument => "CONSTRUCTION_ARGUMENT",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Why one registered variant rejected an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFailure {
    /// Variant name as registered.
    pub variant: &'static str,
    /// Validation message produced by that variant.
    pub message: String,
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no match found for {target}: {}", join_failures(.failures))]
    NoMatch {
        target: &'static str,
        failures: Vec<VariantFailure>,
    },
    #[error("multiple matches found for {target}: {}", .matched.join(", "))]
    AmbiguousVariant {
        target: &'static str,
        matched: Vec<&'static str>,
    },
    #[error("construction argument: {0}")]
    ConstructionArgument(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("timeout")]
    Timeout,
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::NoMatch { .. } => ErrorCode::NoMatch,
            RelayError::AmbiguousVariant { .. } => ErrorCode::AmbiguousVariant,
            RelayError::ConstructionArgument(_) => ErrorCode::ConstructionArgument,
            RelayError::BadRequest(_) => ErrorCode::BadRequest,
            RelayError::PayloadTooLarge => ErrorCode::PayloadTooLarge,
            RelayError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            RelayError::Timeout => ErrorCode::Timeout,
            RelayError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Per-variant diagnostics carried by a `NoMatch` error.
    pub fn failures(&self) -> &[VariantFailure] {
        match self {
            RelayError::NoMatch { failures, .. } => failures,
            _ => &[],
        }
    }
}

fn join_failures(failures: &[VariantFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.variant, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}
