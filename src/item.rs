//! Items and keys.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::errors::{Error, Result};
use crate::value::{Number, Value};

/// Raw item in the SDK's wire representation.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// One row of a table: attribute names mapped to values.
///
/// Iteration follows insertion order, so statements generated from an item
/// list its fields in the order the caller added them. Equality ignores
/// order.
#[derive(Debug, Clone, Default)]
pub struct Item {
    entries: Vec<(String, Value)>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Item::insert`].
    ///
    /// Floats have no infallible conversion because NaN and infinities
    /// cannot be stored; use [`Item::try_with`] for them.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder form for values whose conversion can fail, such as `f64`.
    ///
    /// ```
    /// use dynohelp::Item;
    ///
    /// # fn main() -> dynohelp::Result<()> {
    /// let item = Item::new().with("sku", 7).try_with("price", 9.99)?;
    /// assert_eq!(item.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn try_with<V>(mut self, name: impl Into<String>, value: V) -> Result<Self>
    where
        V: TryInto<Value, Error = Error>,
    {
        self.insert(name, value.try_into()?);
        Ok(self)
    }

    /// Set an attribute. An existing attribute keeps its position and the
    /// previous value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn to_attribute_map(&self) -> AttributeMap {
        self.entries
            .iter()
            .map(|(n, v)| (n.clone(), v.to_attribute_value()))
            .collect()
    }

    /// Convert a wire-format item. Attributes are ordered by name since the
    /// wire map carries no order.
    pub fn from_attribute_map(map: AttributeMap) -> Result<Self> {
        let mut entries = map
            .into_iter()
            .map(|(n, v)| Ok((n, Value::from_attribute_value(v)?)))
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Item { entries })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(n, v)| (n.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Build an item from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match Value::from_json(json) {
            Value::Map(item) => Ok(item),
            _ => Err(Error::Validation(
                "an item must be a JSON object".to_string(),
            )),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut item = Item::new();
        for (k, v) in iter {
            item.insert(k, v);
        }
        item
    }
}

impl IntoIterator for Item {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Value of a key attribute. Keys are never null.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    String(String),
    Number(Number),
}

impl KeyValue {
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            KeyValue::String(s) => AttributeValue::S(s.clone()),
            KeyValue::Number(n) => AttributeValue::N(n.as_str().to_string()),
        }
    }
}

impl From<KeyValue> for Value {
    fn from(k: KeyValue) -> Self {
        match k {
            KeyValue::String(s) => Value::String(s),
            KeyValue::Number(n) => Value::Number(n),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::String(s.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(s: String) -> Self {
        KeyValue::String(s)
    }
}

impl From<Number> for KeyValue {
    fn from(n: Number) -> Self {
        KeyValue::Number(n)
    }
}

macro_rules! key_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for KeyValue {
                fn from(n: $t) -> Self {
                    KeyValue::Number(Number::from(n))
                }
            }
        )*
    };
}

key_value_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

/// A partition or sort key: attribute name and value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub name: String,
    pub value: KeyValue,
}

impl Key {
    pub fn new(name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        Key {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build the wire key map from a partition key and optional sort key.
pub fn key_map(primary_key: &Key, sort_key: Option<&Key>) -> AttributeMap {
    let mut key = HashMap::new();
    key.insert(
        primary_key.name.clone(),
        primary_key.value.to_attribute_value(),
    );
    if let Some(sk) = sort_key {
        key.insert(sk.name.clone(), sk.value.to_attribute_value());
    }
    key
}
