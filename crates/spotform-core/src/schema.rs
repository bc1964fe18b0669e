//! Schema fragments
//!
//! Each field declares the shape of its configuration value. The same
//! fragment validates configuration documents on the way in, validates
//! values written back by flatten functions, and decides whether a slot
//! changed between the observed and the desired configuration.

use crate::error::SchemaError;
use crate::value::{ConfigMap, ConfigValue};
use indexmap::IndexMap;
use serde::Serialize;

/// Ordered attribute name → schema fragment mapping
pub type SchemaMap = IndexMap<String, Schema>;

/// Normalizes a string before it is stored or compared
pub type StateFn = fn(&str) -> String;

/// Returns `true` when `old` and `new` must be considered equal
pub type DiffSuppressFn = fn(&str, &str) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Bool,
    Int,
    List,
    Set,
}

impl ValueType {
    fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::List => "list",
            ValueType::Set => "set",
        }
    }
}

/// Element type of a list or set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    Scalar(ValueType),
    Block(SchemaMap),
}

impl Elem {
    pub fn string() -> Self {
        Self::Scalar(ValueType::String)
    }

    pub fn block<'a>(attributes: impl IntoIterator<Item = (&'a str, Schema)>) -> Self {
        Self::Block(
            attributes
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Elem>,
    #[serde(skip)]
    pub state_func: Option<StateFn>,
    #[serde(skip)]
    pub diff_suppress: Option<DiffSuppressFn>,
}

impl Schema {
    fn of(value_type: ValueType, elem: Option<Elem>) -> Self {
        Self {
            value_type,
            required: false,
            optional: true,
            computed: false,
            default: None,
            max_items: None,
            elem,
            state_func: None,
            diff_suppress: None,
        }
    }

    pub fn string() -> Self {
        Self::of(ValueType::String, None)
    }

    pub fn bool() -> Self {
        Self::of(ValueType::Bool, None)
    }

    pub fn int() -> Self {
        Self::of(ValueType::Int, None)
    }

    pub fn list(elem: Elem) -> Self {
        Self::of(ValueType::List, Some(elem))
    }

    pub fn set(elem: Elem) -> Self {
        Self::of(ValueType::Set, Some(elem))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn with_default(mut self, value: impl Into<ConfigValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_state_func(mut self, f: StateFn) -> Self {
        self.state_func = Some(f);
        self
    }

    pub fn with_diff_suppress(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    /// Nested block schema of a list/set of blocks
    pub fn block_schema(&self) -> Option<&SchemaMap> {
        match &self.elem {
            Some(Elem::Block(map)) => Some(map),
            _ => None,
        }
    }

    /// Validate a value written into a configuration handle
    pub fn check(&self, path: &str, value: &ConfigValue) -> Result<(), SchemaError> {
        let matches = matches!(
            (self.value_type, value),
            (ValueType::String, ConfigValue::String(_))
                | (ValueType::Bool, ConfigValue::Bool(_))
                | (ValueType::Int, ConfigValue::Int(_))
                | (ValueType::List, ConfigValue::List(_))
                | (ValueType::Set, ConfigValue::Set(_))
        );
        if !matches {
            return Err(SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: self.value_type.name(),
                found: value.kind(),
            });
        }

        let Some(items) = value.as_items() else {
            return Ok(());
        };
        self.check_len(path, items.len())?;

        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}.{}", path, index);
            match &self.elem {
                Some(Elem::Scalar(t)) => Schema::of(*t, None).check(&item_path, item)?,
                Some(Elem::Block(attributes)) => {
                    let Some(block) = item.as_block() else {
                        return Err(SchemaError::TypeMismatch {
                            path: item_path,
                            expected: "block",
                            found: item.kind(),
                        });
                    };
                    for (key, v) in block {
                        let attr_path = format!("{}.{}", item_path, key);
                        match attributes.get(key) {
                            Some(schema) => schema.check(&attr_path, v)?,
                            None => return Err(SchemaError::UnknownField { path: attr_path }),
                        }
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    fn check_len(&self, path: &str, len: usize) -> Result<(), SchemaError> {
        match self.max_items {
            Some(max) if len > max => Err(SchemaError::TooManyItems {
                path: path.to_string(),
                max,
                found: len,
            }),
            _ => Ok(()),
        }
    }

    /// Decode a raw document value according to this fragment
    pub fn decode(&self, path: &str, json: &serde_json::Value) -> Result<ConfigValue, SchemaError> {
        let mismatch = || SchemaError::TypeMismatch {
            path: path.to_string(),
            expected: self.value_type.name(),
            found: json_kind(json),
        };

        match self.value_type {
            ValueType::String => json
                .as_str()
                .map(|s| ConfigValue::String(s.to_string()))
                .ok_or_else(mismatch),
            ValueType::Bool => json.as_bool().map(ConfigValue::Bool).ok_or_else(mismatch),
            ValueType::Int => json.as_i64().map(ConfigValue::Int).ok_or_else(mismatch),
            ValueType::List | ValueType::Set => {
                let array = json.as_array().ok_or_else(mismatch)?;
                let mut items: Vec<ConfigValue> = Vec::with_capacity(array.len());
                for (index, raw) in array.iter().enumerate() {
                    let item = self.decode_elem(&format!("{}.{}", path, index), raw)?;
                    if self.value_type == ValueType::Set && items.contains(&item) {
                        continue;
                    }
                    items.push(item);
                }
                self.check_len(path, items.len())?;
                Ok(if self.value_type == ValueType::Set {
                    ConfigValue::Set(items)
                } else {
                    ConfigValue::List(items)
                })
            }
        }
    }

    fn decode_elem(&self, path: &str, json: &serde_json::Value) -> Result<ConfigValue, SchemaError> {
        match &self.elem {
            Some(Elem::Scalar(t)) => Schema::of(*t, None).decode(path, json),
            Some(Elem::Block(attributes)) => match json.as_object() {
                Some(object) => decode_block(attributes, path, object).map(ConfigValue::Block),
                None => Err(SchemaError::TypeMismatch {
                    path: path.to_string(),
                    expected: "block",
                    found: json_kind(json),
                }),
            },
            None => Err(SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: "scalar",
                found: json_kind(json),
            }),
        }
    }

    /// Apply the state function to string values
    pub fn normalize(&self, value: &ConfigValue) -> ConfigValue {
        match (self.state_func, value) {
            (Some(f), ConfigValue::String(s)) => ConfigValue::String(f(s)),
            _ => value.clone(),
        }
    }

    /// Whether the desired value differs from the observed one
    ///
    /// A computed attribute that is not configured never differs.
    pub fn differs(&self, observed: Option<&ConfigValue>, desired: Option<&ConfigValue>) -> bool {
        if self.computed && desired.is_none() {
            return false;
        }
        let desired = desired.map(|v| self.normalize(v));

        if self.value_type == ValueType::String {
            let old = observed.and_then(ConfigValue::as_str).unwrap_or_default();
            let new = desired
                .as_ref()
                .and_then(ConfigValue::as_str)
                .unwrap_or_default();
            if let Some(suppress) = self.diff_suppress {
                if suppress(old, new) {
                    return false;
                }
            }
            return old != new;
        }

        let old = observed.filter(|v| !v.is_zero());
        let new = desired.as_ref().filter(|v| !v.is_zero());
        match (old, new) {
            (None, None) => false,
            (Some(a), Some(b)) => !a.equivalent(b),
            _ => true,
        }
    }
}

/// Decode a JSON object into a block, applying defaults and required checks
pub fn decode_block(
    attributes: &SchemaMap,
    path: &str,
    object: &serde_json::Map<String, serde_json::Value>,
) -> Result<ConfigMap, SchemaError> {
    let mut block = ConfigMap::new();

    for (key, raw) in object {
        let attr_path = join_path(path, key);
        let Some(schema) = attributes.get(key) else {
            return Err(SchemaError::UnknownField { path: attr_path });
        };
        if raw.is_null() {
            continue;
        }
        block.insert(key.clone(), schema.decode(&attr_path, raw)?);
    }

    fill_missing(attributes, path, &mut block)?;
    Ok(block)
}

/// Apply defaults and required checks to a partially decoded block
pub fn fill_missing(
    attributes: &SchemaMap,
    path: &str,
    block: &mut ConfigMap,
) -> Result<(), SchemaError> {
    for (key, schema) in attributes {
        if block.contains_key(key) {
            continue;
        }
        if let Some(default) = &schema.default {
            block.insert(key.clone(), default.clone());
        } else if schema.required {
            return Err(SchemaError::MissingRequired {
                path: join_path(path, key),
            });
        }
    }
    Ok(())
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Kind name of a raw JSON value, used in shape errors
pub fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_i64() => "int",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
