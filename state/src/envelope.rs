//! Kind-tagged serialization of stored values.
//!
//! Values are stored as `{"type": <kind>, "value": <value>}` so a read can
//! restore the kind that was written: the number `5` and the string `"5"`
//! come back distinct. `null` is stored as the bare literal `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::StateError;

/// Stored representation of a null value.
pub const NULL_SENTINEL: &str = "null";

/// The primitive kind recorded in an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Text.
    String,
    /// A JSON number.
    Number,
    /// An object or array.
    Object,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    #[serde(rename = "type")]
    kind: Kind,
    value: &'a Value,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Kind,
    value: Value,
}

/// Classifies a JSON value into its envelope kind; `None` for null.
///
/// # Errors
///
/// Returns [`StateError::UnsupportedType`] for booleans.
pub fn kind_of(value: &Value) -> Result<Option<Kind>, StateError> {
    match value {
        Value::Null => Ok(None),
        Value::String(_) => Ok(Some(Kind::String)),
        Value::Number(_) => Ok(Some(Kind::Number)),
        Value::Array(_) | Value::Object(_) => Ok(Some(Kind::Object)),
        Value::Bool(_) => Err(StateError::UnsupportedType("boolean")),
    }
}

/// Encodes `value` into its stored text.
///
/// # Errors
///
/// Fails for unsupported kinds.
pub fn encode(value: &Value) -> Result<String, StateError> {
    let Some(kind) = kind_of(value)? else {
        return Ok(NULL_SENTINEL.to_owned());
    };
    serde_json::to_string(&EnvelopeRef { kind, value })
        .map_err(|error| StateError::Serialize(error.to_string()))
}

/// Decodes stored text, coercing the payload back to the tagged kind.
///
/// # Errors
///
/// Returns [`StateError::Malformed`] when `raw` is not an envelope or its
/// payload cannot be coerced to the tagged kind.
pub fn decode(raw: &str) -> Result<Option<Value>, StateError> {
    if raw == NULL_SENTINEL {
        return Ok(None);
    }
    let envelope: Envelope =
        serde_json::from_str(raw).map_err(|error| StateError::Malformed(error.to_string()))?;
    match envelope.kind {
        Kind::String => Ok(Some(Value::String(as_text(envelope.value)))),
        Kind::Number => as_number(envelope.value).map(|number| Some(Value::Number(number))),
        Kind::Object => Ok(match envelope.value {
            Value::Null => None,
            value => Some(value),
        }),
    }
}

fn as_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn as_number(value: Value) -> Result<Number, StateError> {
    match value {
        Value::Number(number) => Ok(number),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
                .ok_or_else(|| StateError::Malformed(format!("`{text}` is not a number")))
        }
        other => Err(StateError::Malformed(format!(
            "expected a number payload, found `{other}`"
        ))),
    }
}
