//! Field registry
//!
//! One registry per resource type, filled by one or more `setup` routines
//! and immutable afterwards. Registering a name that already exists
//! replaces the earlier descriptor in place: extension modules rely on this
//! to take over fields contributed by a base module.

use crate::error::{Result, SchemaError};
use crate::field::{FieldDescriptor, FieldName};
use crate::handle::ConfigHandle;
use crate::schema::{SchemaMap, fill_missing};
use crate::value::ConfigMap;
use indexmap::IndexMap;
use std::sync::{Arc, OnceLock};

pub struct FieldRegistry<R> {
    name: &'static str,
    fields: IndexMap<FieldName, FieldDescriptor<R>>,
    schema: OnceLock<Arc<SchemaMap>>,
}

impl<R> FieldRegistry<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: IndexMap::new(),
            schema: OnceLock::new(),
        }
    }

    /// Resource name used in log lines
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a descriptor; returns the one it replaced, if any
    pub fn register(&mut self, field: FieldDescriptor<R>) -> Option<FieldDescriptor<R>> {
        self.schema = OnceLock::new();
        let name = field.name();
        let previous = self.fields.insert(name, field);
        if previous.is_some() {
            tracing::debug!("{}: field [{}] overridden by later registration", self.name, name);
        }
        previous
    }

    pub fn get(&self, name: FieldName) -> Option<&FieldDescriptor<R>> {
        self.fields.get(&name)
    }

    pub fn contains(&self, name: FieldName) -> bool {
        self.fields.contains_key(&name)
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor<R>> {
        self.fields.values()
    }

    pub fn field_names(&self) -> Vec<FieldName> {
        self.fields.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Schema fragments of all registered fields, keyed by field name
    pub fn schema_map(&self) -> Arc<SchemaMap> {
        self.schema
            .get_or_init(|| {
                Arc::new(
                    self.fields
                        .values()
                        .map(|f| (f.name().to_string(), f.schema().clone()))
                        .collect(),
                )
            })
            .clone()
    }

    /// Empty handle bound to this resource's schema
    pub fn handle(&self) -> ConfigHandle {
        ConfigHandle::new(self.schema_map())
    }

    /// Decode a configuration document into a validated handle
    ///
    /// `null` attributes count as absent. Fields with a custom deserializer
    /// decode their own raw value.
    pub fn decode_config(&self, document: &serde_json::Value) -> Result<ConfigHandle> {
        let Some(object) = document.as_object() else {
            return Err(SchemaError::TypeMismatch {
                path: self.name.to_string(),
                expected: "object",
                found: crate::schema::json_kind(document),
            }
            .into());
        };

        let schema = self.schema_map();
        let mut desired = ConfigMap::new();
        for (key, raw) in object {
            let Some(field) = self.fields.values().find(|f| f.name().as_str() == key) else {
                return Err(SchemaError::UnknownField { path: key.clone() }.into());
            };
            if raw.is_null() {
                continue;
            }
            let value = match field.deserializer() {
                Some(deserialize) => deserialize(field.schema(), key, raw)?,
                None => field.schema().decode(key, raw)?,
            };
            desired.insert(key.clone(), value);
        }
        fill_missing(&schema, "", &mut desired)?;

        let mut handle = ConfigHandle::new(schema);
        handle.replace_desired(desired);
        Ok(handle)
    }
}

impl<R> std::fmt::Debug for FieldRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .finish()
    }
}
