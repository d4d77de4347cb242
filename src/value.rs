//! Attribute value model.
//!
//! [`Value`] mirrors DynamoDB's attribute-value types as a closed enum and
//! converts explicitly to and from the SDK's [`AttributeValue`] and
//! `serde_json::Value`.

use std::fmt;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::errors::{Error, Result};
use crate::item::Item;

/// A DynamoDB number.
///
/// DynamoDB transports numbers as decimal text, so the text form is what
/// gets stored. Construct from any Rust integer, from a finite float via
/// `TryFrom<f64>`, or from text via [`Number::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Parse decimal text such as `"42"`, `"-0.5"` or `"1E+3"`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let well_formed = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
            && trimmed.chars().any(|c| c.is_ascii_digit());
        if !well_formed || trimmed.parse::<f64>().map_or(true, |f| !f.is_finite()) {
            return Err(Error::Serialization(format!("Invalid number: {}", text)));
        }
        Ok(Number(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value as an `i64`, if the text is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number(n.to_string())
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl TryFrom<f64> for Number {
    type Error = Error;

    fn try_from(f: f64) -> Result<Self> {
        if !f.is_finite() {
            return Err(Error::Serialization(format!(
                "DynamoDB cannot store non-finite number {}",
                f
            )));
        }
        Ok(Number(f.to_string()))
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Map(Item),
    StringSet(Vec<String>),
    NumberSet(Vec<Number>),
    BinarySet(Vec<Vec<u8>>),
}

impl Value {
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Convert to the SDK wire representation.
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::N(n.0.clone()),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Binary(b) => AttributeValue::B(Blob::new(b.clone())),
            Value::List(list) => {
                AttributeValue::L(list.iter().map(Value::to_attribute_value).collect())
            }
            Value::Map(item) => AttributeValue::M(item.to_attribute_map()),
            Value::StringSet(ss) => AttributeValue::Ss(ss.clone()),
            Value::NumberSet(ns) => AttributeValue::Ns(ns.iter().map(|n| n.0.clone()).collect()),
            Value::BinarySet(bs) => {
                AttributeValue::Bs(bs.iter().map(|b| Blob::new(b.clone())).collect())
            }
        }
    }

    /// Convert from the SDK wire representation.
    pub fn from_attribute_value(value: AttributeValue) -> Result<Self> {
        let converted = match value {
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::N(n) => Value::Number(Number::parse(&n)?),
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::B(b) => Value::Binary(b.into_inner()),
            AttributeValue::L(list) => Value::List(
                list.into_iter()
                    .map(Value::from_attribute_value)
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::M(map) => Value::Map(Item::from_attribute_map(map)?),
            AttributeValue::Ss(ss) => Value::StringSet(ss),
            AttributeValue::Ns(ns) => Value::NumberSet(
                ns.iter()
                    .map(|n| Number::parse(n))
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::Bs(bs) => {
                Value::BinarySet(bs.into_iter().map(Blob::into_inner).collect())
            }
            _ => {
                return Err(Error::Serialization(
                    "Unknown DynamoDB AttributeValue type".to_string(),
                ))
            }
        };
        Ok(converted)
    }

    /// Render as plain JSON. Binary data becomes base64 text and sets become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(n),
            Value::String(s) => Json::String(s.clone()),
            Value::Binary(b) => Json::String(BASE64.encode(b)),
            Value::List(list) => Json::Array(list.iter().map(Value::to_json).collect()),
            Value::Map(item) => item.to_json(),
            Value::StringSet(ss) => Json::Array(ss.iter().cloned().map(Json::String).collect()),
            Value::NumberSet(ns) => Json::Array(ns.iter().map(number_to_json).collect()),
            Value::BinarySet(bs) => Json::Array(
                bs.iter()
                    .map(|b| Json::String(BASE64.encode(b)))
                    .collect(),
            ),
        }
    }

    /// Build a value from plain JSON. Objects become maps and arrays become lists.
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(Number(n.to_string())),
            Json::String(s) => Value::String(s),
            Json::Array(list) => Value::List(list.into_iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Decode base64 text into a binary value.
    pub fn binary_from_base64(encoded: &str) -> Result<Self> {
        BASE64
            .decode(encoded)
            .map(Value::Binary)
            .map_err(|e| Error::Serialization(format!("Invalid base64 encoding: {}", e)))
    }
}

fn number_to_json(n: &Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        return serde_json::Value::from(i);
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(n.0.clone()))
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl TryFrom<f64> for Value {
    type Error = Error;

    fn try_from(f: f64) -> Result<Self> {
        Number::try_from(f).map(Value::Number)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::Map(item)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
