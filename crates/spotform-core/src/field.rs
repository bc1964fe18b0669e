//! Field descriptors
//!
//! A [`FieldDescriptor`] is one independently testable unit of
//! reconciliation: a schema fragment plus the functions translating the
//! field between the remote object `R` and a [`ConfigHandle`].

use crate::error::{Result, SchemaError};
use crate::handle::ConfigHandle;
use crate::schema::Schema;
use crate::value::ConfigValue;
use serde::Serialize;
use std::fmt;

/// Name of a configurable attribute, unique within a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldName(&'static str);

impl FieldName {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Resource type a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceType(&'static str);

impl ResourceType {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Flatten: remote object → configuration handle
pub type ReadFn<R> = fn(&R, &mut ConfigHandle) -> Result<()>;

/// Expand: configuration handle → remote object
pub type ExpandFn<R> = fn(&ConfigHandle, &mut R) -> Result<()>;

/// Replaces schema-driven decoding of the raw document value
pub type DeserializeFn =
    fn(&Schema, &str, &serde_json::Value) -> std::result::Result<ConfigValue, SchemaError>;

pub struct FieldDescriptor<R> {
    resource_type: ResourceType,
    name: FieldName,
    schema: Schema,
    on_read: Option<ReadFn<R>>,
    on_create: Option<ExpandFn<R>>,
    on_update: Option<ExpandFn<R>>,
    deserializer: Option<DeserializeFn>,
}

impl<R> FieldDescriptor<R> {
    pub fn new(resource_type: ResourceType, name: FieldName, schema: Schema) -> Self {
        Self {
            resource_type,
            name,
            schema,
            on_read: None,
            on_create: None,
            on_update: None,
            deserializer: None,
        }
    }

    pub fn with_read(mut self, f: ReadFn<R>) -> Self {
        self.on_read = Some(f);
        self
    }

    pub fn with_create(mut self, f: ExpandFn<R>) -> Self {
        self.on_create = Some(f);
        self
    }

    pub fn with_update(mut self, f: ExpandFn<R>) -> Self {
        self.on_update = Some(f);
        self
    }

    pub fn with_deserializer(mut self, f: DeserializeFn) -> Self {
        self.deserializer = Some(f);
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn name(&self) -> FieldName {
        self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn deserializer(&self) -> Option<DeserializeFn> {
        self.deserializer
    }

    pub fn has_update(&self) -> bool {
        self.on_update.is_some()
    }

    /// Returns `Ok(false)` when the descriptor has no read function
    pub fn read(&self, remote: &R, handle: &mut ConfigHandle) -> Result<bool> {
        match self.on_read {
            Some(f) => f(remote, handle).map(|_| true),
            None => Ok(false),
        }
    }

    /// Returns `Ok(false)` when the descriptor has no create function
    pub fn create(&self, handle: &ConfigHandle, remote: &mut R) -> Result<bool> {
        match self.on_create {
            Some(f) => f(handle, remote).map(|_| true),
            None => Ok(false),
        }
    }

    /// Returns `Ok(false)` when the descriptor has no update function
    pub fn update(&self, handle: &ConfigHandle, remote: &mut R) -> Result<bool> {
        match self.on_update {
            Some(f) => f(handle, remote).map(|_| true),
            None => Ok(false),
        }
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("resource_type", &self.resource_type)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("on_read", &self.on_read.is_some())
            .field("on_create", &self.on_create.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}
