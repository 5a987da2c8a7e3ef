//! Runtime value model shared by every schema.
//!
//! JSON has no notion of `undefined`, big integers or symbols, but the
//! discriminator model needs all three, so schemas parse [`Value`] rather than
//! `serde_json::Value` directly. Conversions in both directions are provided.

use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize, Serializer};

/// A dynamically-typed value as seen by the parser.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// An absent value (a missing object key reads as `Undefined`).
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// A symbol-like opaque tag, identified by its description.
    Symbol(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

/// The parsed type of a [`Value`], as reported in `invalid_type` issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Undefined,
    Null,
    Boolean,
    Number,
    Nan,
    Bigint,
    String,
    Symbol,
    Array,
    Object,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Undefined => "undefined",
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::Nan => "nan",
            ValueType::Bigint => "bigint",
            ValueType::String => "string",
            ValueType::Symbol => "symbol",
            ValueType::Array => "array",
            ValueType::Object => "object",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Build an object value from `(key, value)` pairs, preserving order.
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undefined => ValueType::Undefined,
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(n) if n.is_nan() => ValueType::Nan,
            Value::Number(_) => ValueType::Number,
            Value::BigInt(_) => ValueType::Bigint,
            Value::String(_) => ValueType::String,
            Value::Symbol(_) => ValueType::Symbol,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up an object key. Non-objects and missing keys both yield `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Convert to `serde_json::Value`.
    ///
    /// Undefined object entries are dropped, undefined array items and a
    /// top-level undefined become `null`, big integers become decimal strings,
    /// and symbols render as `"Symbol(description)"`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(n) => serde_json::Value::String(n.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Symbol(s) => serde_json::Value::String(format!("Symbol({s})")),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Integral floats within the exactly-representable range render as JSON
/// integers so `1.0` round-trips as `1`.
fn number_to_json(n: f64) -> serde_json::Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

// ---------------------------------------------------------------------------
// Primitive (discriminator values)
// ---------------------------------------------------------------------------

/// A hashable primitive value: the key type of a dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    BigInt(i128),
    String(String),
    Symbol(String),
}

impl Primitive {
    /// The primitive behind `value`, or `None` for arrays and objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Undefined => Some(Primitive::Undefined),
            Value::Null => Some(Primitive::Null),
            Value::Bool(b) => Some(Primitive::Bool(*b)),
            Value::Number(n) => Some(Primitive::Number(OrderedFloat(*n))),
            Value::BigInt(n) => Some(Primitive::BigInt(*n)),
            Value::String(s) => Some(Primitive::String(s.clone())),
            Value::Symbol(s) => Some(Primitive::Symbol(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Primitive behind a JSON scalar; arrays and objects yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
            scalar => Primitive::from_value(&Value::from(scalar.clone())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Primitive::Undefined => Value::Undefined,
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(*b),
            Primitive::Number(n) => Value::Number(n.into_inner()),
            Primitive::BigInt(n) => Value::BigInt(*n),
            Primitive::String(s) => Value::String(s.clone()),
            Primitive::Symbol(s) => Value::Symbol(s.clone()),
        }
    }

    /// Render for `'a' | 'b'` style message lists: strings are single-quoted.
    pub(crate) fn quoted(&self) -> String {
        match self {
            Primitive::String(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Undefined => f.write_str("undefined"),
            Primitive::Null => f.write_str("null"),
            Primitive::Bool(b) => write!(f, "{b}"),
            Primitive::Number(n) => write!(f, "{}", n.into_inner()),
            Primitive::BigInt(n) => write!(f, "{n}"),
            Primitive::String(s) => f.write_str(s),
            Primitive::Symbol(s) => write!(f, "Symbol({s})"),
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().to_json().serialize(serializer)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Number(OrderedFloat(value))
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Number(OrderedFloat(f64::from(value)))
    }
}

impl From<i128> for Primitive {
    fn from(value: i128) -> Self {
        Primitive::BigInt(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip_drops_undefined_entries() {
        let value = Value::object([
            ("type", Value::from("a")),
            ("missing", Value::Undefined),
            ("n", Value::from(1)),
        ]);
        assert_eq!(value.to_json(), json!({"type": "a", "n": 1}));
    }

    #[test]
    fn test_from_json_numbers_are_floats() {
        let value = Value::from(json!({"n": 2}));
        assert_eq!(value.get("n"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_value_type_reports_nan() {
        assert_eq!(Value::Number(f64::NAN).value_type(), ValueType::Nan);
        assert_eq!(Value::Null.value_type(), ValueType::Null);
        assert_eq!(Value::Undefined.value_type().to_string(), "undefined");
    }

    #[test]
    fn test_primitive_distinguishes_kinds() {
        let string_one = Primitive::from("1");
        let number_one = Primitive::from(1);
        let bigint_one = Primitive::from(1_i128);
        assert_ne!(string_one, number_one);
        assert_ne!(number_one, bigint_one);
        assert_eq!(Primitive::from_value(&Value::Number(1.0)), Some(number_one));
    }

    #[test]
    fn test_primitive_rejects_containers() {
        assert_eq!(Primitive::from_value(&Value::Array(vec![])), None);
        assert_eq!(Primitive::from_json(&json!({"a": 1})), None);
        assert_eq!(Primitive::from_json(&json!(null)), Some(Primitive::Null));
    }

    #[test]
    fn test_primitive_quoted() {
        assert_eq!(Primitive::from("a").quoted(), "'a'");
        assert_eq!(Primitive::from(2).quoted(), "2");
        assert_eq!(Primitive::Undefined.quoted(), "undefined");
    }
}
