//! Configuration handle
//!
//! Holds the desired configuration supplied by the caller and the observed
//! state written back by flatten functions. Expand functions only read the
//! desired layer; flatten functions only write the observed layer, and
//! every write is validated against the field's schema fragment.

use crate::error::{ReconcileError, SchemaError};
use crate::field::FieldName;
use crate::schema::SchemaMap;
use crate::value::{ConfigMap, ConfigValue};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ConfigHandle {
    id: Option<String>,
    schema: Arc<SchemaMap>,
    desired: ConfigMap,
    observed: ConfigMap,
}

impl ConfigHandle {
    pub fn new(schema: Arc<SchemaMap>) -> Self {
        Self {
            id: None,
            schema,
            desired: ConfigMap::new(),
            observed: ConfigMap::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Forget the remote identity (the resource is gone)
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    // ---- desired layer ----

    pub fn desired(&self) -> &ConfigMap {
        &self.desired
    }

    /// Desired value of a slot, as supplied
    pub fn get(&self, name: impl AsRef<str>) -> Option<&ConfigValue> {
        self.desired.get(name.as_ref())
    }

    /// Desired value of a slot, unless it is absent or a zero value
    pub fn get_ok(&self, name: impl AsRef<str>) -> Option<&ConfigValue> {
        self.get(name).filter(|v| !v.is_zero())
    }

    /// Non-empty desired string
    pub fn get_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.get(name)
            .and_then(ConfigValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn get_bool(&self, name: impl AsRef<str>) -> Option<bool> {
        self.get(name).and_then(ConfigValue::as_bool)
    }

    pub fn get_int(&self, name: impl AsRef<str>) -> Option<i64> {
        self.get(name).and_then(ConfigValue::as_int)
    }

    /// Set a desired value without schema validation
    pub fn set_desired(&mut self, name: impl Into<String>, value: impl Into<ConfigValue>) {
        self.desired.insert(name.into(), value.into());
    }

    pub fn remove_desired(&mut self, name: impl AsRef<str>) -> Option<ConfigValue> {
        self.desired.remove(name.as_ref())
    }

    pub fn with_desired(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set_desired(name, value);
        self
    }

    pub(crate) fn replace_desired(&mut self, desired: ConfigMap) {
        self.desired = desired;
    }

    // ---- observed layer ----

    pub fn observed(&self) -> &ConfigMap {
        &self.observed
    }

    pub fn observed_value(&self, name: impl AsRef<str>) -> Option<&ConfigValue> {
        self.observed.get(name.as_ref())
    }

    /// Record the observed value of a slot
    pub fn set(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<ConfigValue>,
    ) -> Result<(), SchemaError> {
        let name = name.as_ref();
        let value = value.into();
        match self.schema.get(name) {
            Some(schema) => schema.check(name, &value)?,
            None => {
                return Err(SchemaError::UnknownField {
                    path: name.to_string(),
                })
            }
        }
        self.observed.insert(name.to_string(), value);
        Ok(())
    }

    /// [`set`](Self::set) for flatten functions, reporting a read failure
    /// of `field`
    pub fn set_field(
        &mut self,
        field: FieldName,
        value: impl Into<ConfigValue>,
    ) -> crate::error::Result<()> {
        self.set(field, value)
            .map_err(|e| ReconcileError::read(field, e))
    }

    /// Replace the observed layer with previously persisted state
    pub fn load_observed(&mut self, observed: ConfigMap) -> Result<(), SchemaError> {
        for (name, value) in observed {
            self.set(&name, value)?;
        }
        Ok(())
    }

    /// Whether the desired value of a slot differs from the observed one
    pub fn has_change(&self, name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        let observed = self.observed.get(name);
        let desired = self.desired.get(name);
        match self.schema.get(name) {
            Some(schema) => schema.differs(observed, desired),
            None => observed != desired,
        }
    }
}
