//! Discriminated envelope over a `OneOf` union.
//!
//! An envelope holds at most one resolved variant (the actual instance).
//! It is built once per message and never mutated afterwards.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};
use crate::protocol::oneof::{resolve, OneOf};

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    actual: Option<T>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self { actual: None }
    }
}

impl<T: OneOf> Envelope<T> {
    /// Envelope around an already typed variant. Always resolved.
    pub fn new(inner: T) -> Self {
        Self {
            actual: Some(inner),
        }
    }

    /// Unresolved envelope. Serializes to `null`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a pre-built instance of any serializable type.
    ///
    /// The instance is checked against every registered variant and must
    /// match exactly one of them.
    pub fn wrap<V: Serialize + ?Sized>(instance: &V) -> Result<Self> {
        let raw = serde_json::to_value(instance).map_err(|e| {
            RelayError::ConstructionArgument(format!("instance is not serializable: {e}"))
        })?;
        Self::from_value(&raw)
    }

    /// Build a fresh instance from named fields.
    pub fn build<I, K>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut obj = Map::new();
        for (name, value) in fields {
            let name = name.into();
            if obj.contains_key(&name) {
                return Err(RelayError::ConstructionArgument(format!(
                    "field `{name}` given more than once"
                )));
            }
            obj.insert(name, value);
        }
        if obj.is_empty() {
            return Err(RelayError::ConstructionArgument(
                "at least one field is required".into(),
            ));
        }
        Self::from_value(&Value::Object(obj))
    }

    /// Parse JSON text.
    pub fn parse(s: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(s)
            .map_err(|e| RelayError::BadRequest(format!("invalid json: {e}")))?;
        Self::from_value(&raw)
    }

    /// Resolve an already parsed JSON value. `null` is the unresolved
    /// envelope, mirroring what `to_value` emits for it.
    pub fn from_value(raw: &Value) -> Result<Self> {
        if raw.is_null() {
            return Ok(Self::empty());
        }
        resolve::<T>(raw).map(Self::new)
    }

    /// Mapping form of the resolved variant, `Value::Null` when unresolved.
    pub fn to_value(&self) -> Result<Value> {
        match &self.actual {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Null),
        }
    }

    /// JSON text of the resolved variant, `"null"` when unresolved.
    pub fn to_json(&self) -> Result<String> {
        let v = self.to_value()?;
        serde_json::to_string(&v)
            .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
    }

    pub fn is_resolved(&self) -> bool {
        self.actual.is_some()
    }

    pub fn variant_name(&self) -> Option<&'static str> {
        self.actual.as_ref().map(|v| v.variant_name())
    }

    pub fn inner(&self) -> Option<&T> {
        self.actual.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.actual
    }
}

impl<T: OneOf> From<T> for Envelope<T> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

impl<T: OneOf> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        self.to_value()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, T: OneOf> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(&raw).map_err(D::Error::custom)
    }
}
