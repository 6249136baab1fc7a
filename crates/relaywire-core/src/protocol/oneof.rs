//! Exclusivity matching over a closed, ordered set of variant validators.
//!
//! Every variant is tried, in declared order, against the same input. The
//! input resolves only if exactly one variant accepts it:
//! - zero accepted => `RelayError::NoMatch` with one failure per variant
//! - more than one => `RelayError::AmbiguousVariant` naming the matches
//!
//! Order only shapes the diagnostics. It never breaks ties.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RelayError, Result, VariantFailure};

/// Validator signature: accept the raw value as `T` or explain why not.
pub type ParseFn<T> = fn(&Value) -> std::result::Result<T, String>;

/// One registered member of a oneOf set.
pub struct Variant<T> {
    /// Schema name used in diagnostics.
    pub name: &'static str,
    /// Strict validator for this variant.
    pub parse: ParseFn<T>,
}

impl<T> Clone for Variant<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Variant<T> {}

impl<T> std::fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variant").field("name", &self.name).finish()
    }
}

/// A closed union resolved structurally from JSON.
pub trait OneOf: Sized + 'static {
    /// Union name used in diagnostics.
    const NAME: &'static str;

    /// Registered variants in declared order.
    fn variants() -> &'static [Variant<Self>];

    /// Name of the variant this value holds.
    fn variant_name(&self) -> &'static str;

    /// Serialize through the held variant's own serializer.
    fn to_value(&self) -> Result<Value>;
}

/// Resolve `raw` against all variants of `T`.
pub fn resolve<T: OneOf>(raw: &Value) -> Result<T> {
    resolve_with(T::NAME, T::variants(), raw)
}

/// Resolve `raw` against an explicit variant list.
pub fn resolve_with<T>(target: &'static str, variants: &[Variant<T>], raw: &Value) -> Result<T> {
    let mut failures = Vec::new();
    let mut matched: Vec<(&'static str, T)> = Vec::new();

    for variant in variants {
        match (variant.parse)(raw) {
            Ok(v) => matched.push((variant.name, v)),
            Err(message) => failures.push(VariantFailure {
                variant: variant.name,
                message,
            }),
        }
    }

    if matched.len() > 1 {
        let names: Vec<&'static str> = matched.iter().map(|(n, _)| *n).collect();
        tracing::debug!(target_union = target, matched = ?names, "ambiguous oneOf input");
        return Err(RelayError::AmbiguousVariant {
            target,
            matched: names,
        });
    }

    match matched.pop() {
        Some((_, v)) => Ok(v),
        None => {
            tracing::debug!(
                target_union = target,
                attempts = failures.len(),
                "oneOf input matched nothing"
            );
            Err(RelayError::NoMatch { target, failures })
        }
    }
}

/// Strict serde deserialization of a borrowed JSON value.
pub fn strict<T: DeserializeOwned>(raw: &Value) -> std::result::Result<T, String> {
    T::deserialize(raw).map_err(|e| e.to_string())
}

/// Require `raw[field]` to be the string `expected`.
pub fn expect_tag(raw: &Value, field: &str, expected: &str) -> std::result::Result<(), String> {
    match raw.get(field) {
        Some(Value::String(s)) if s == expected => Ok(()),
        Some(Value::String(s)) => Err(format!("`{field}` must be `{expected}`, got `{s}`")),
        Some(other) => Err(format!("`{field}` must be a string, got {other}")),
        None => Err(format!("missing field `{field}`")),
    }
}
