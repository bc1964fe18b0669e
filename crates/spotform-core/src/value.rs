//! Configuration values
//!
//! A [`ConfigValue`] is the typed form of one attribute in a configuration
//! block. Only the shapes actually used by resource schemas exist: scalars,
//! ordered lists, unordered sets and nested blocks.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Attributes of a nested block, keyed by attribute name
pub type ConfigMap = BTreeMap<String, ConfigValue>;

#[derive(Debug, Clone)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Int(i64),
    /// Ordered list (scalars or blocks)
    List(Vec<ConfigValue>),
    /// Unordered set (scalars or blocks)
    Set(Vec<ConfigValue>),
    Block(ConfigMap),
}

impl ConfigValue {
    /// Build a block from `(name, value)` pairs
    pub fn block<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigValue)>,
    {
        Self::Block(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list of strings
    pub fn string_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::List(
            items
                .into_iter()
                .map(|s| Self::String(s.into()))
                .collect(),
        )
    }

    /// Human readable name of the variant, used in shape errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Block(_) => "block",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Items of a list or a set
    pub fn as_items(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&ConfigMap> {
        match self {
            Self::Block(map) => Some(map),
            _ => None,
        }
    }

    /// Whether the value equals the zero value of its type
    ///
    /// Zero values are indistinguishable from absent ones when deciding
    /// whether an attribute is set.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::List(items) | Self::Set(items) => items.is_empty(),
            Self::Block(map) => map.values().all(ConfigValue::is_zero),
        }
    }

    /// Compare two values treating absent block attributes as zero values
    pub fn equivalent(&self, other: &ConfigValue) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Self::Set(a), Self::Set(b)) => multiset_eq(a, b, ConfigValue::equivalent),
            (Self::Block(a), Self::Block(b)) => a.keys().chain(b.keys()).all(|key| {
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => x.equivalent(y),
                    (Some(v), None) | (None, Some(v)) => v.is_zero(),
                    (None, None) => true,
                }
            }),
            _ => self == other,
        }
    }

    /// Convert into plain JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::List(items) | Self::Set(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            Self::Block(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn multiset_eq(
    a: &[ConfigValue],
    b: &[ConfigValue],
    eq: fn(&ConfigValue, &ConfigValue) -> bool,
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        match (0..b.len()).find(|&i| !used[i] && eq(x, &b[i])) {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => multiset_eq(a, b, |x, y| x == y),
            (Self::Block(a), Self::Block(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::List(items) | Self::Set(items) => serializer.collect_seq(items),
            Self::Block(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    state.serialize_entry(k, v)?;
                }
                state.end()
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        Self::Block(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_equality_ignores_order() {
        let a = ConfigValue::Set(vec!["a".into(), "b".into()]);
        let b = ConfigValue::Set(vec!["b".into(), "a".into()]);
        assert_eq!(a, b);

        let list_a = ConfigValue::string_list(["a", "b"]);
        let list_b = ConfigValue::string_list(["b", "a"]);
        assert_ne!(list_a, list_b);
    }

    #[test]
    fn test_zero_values() {
        assert!(ConfigValue::from("").is_zero());
        assert!(ConfigValue::from(false).is_zero());
        assert!(ConfigValue::from(0i64).is_zero());
        assert!(ConfigValue::List(vec![]).is_zero());
        assert!(!ConfigValue::from("x").is_zero());
        assert!(!ConfigValue::List(vec![ConfigValue::block::<&str, _>([])]).is_zero());
    }

    #[test]
    fn test_equivalent_treats_missing_block_keys_as_zero() {
        let a = ConfigValue::block([
            ("tokens", ConfigValue::from("required")),
            ("limit", ConfigValue::from(0i64)),
        ]);
        let b = ConfigValue::block([("tokens", ConfigValue::from("required"))]);
        assert!(a.equivalent(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialize_as_plain_json() {
        let value = ConfigValue::List(vec![ConfigValue::block([
            ("http_tokens", ConfigValue::from("required")),
            ("http_put_response_hop_limit", ConfigValue::from(2i64)),
        ])]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"http_tokens": "required", "http_put_response_hop_limit": 2}])
        );
        assert_eq!(json, value.to_json());
    }
}
