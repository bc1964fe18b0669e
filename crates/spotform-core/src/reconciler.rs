//! Reconciliation driver
//!
//! Runs the registered descriptors of one resource type against a remote
//! object and a configuration handle. Every pass is synchronous and the
//! first error aborts it; the partially built remote object is dropped.

use crate::error::Result;
use crate::field::FieldName;
use crate::handle::ConfigHandle;
use crate::registry::FieldRegistry;
use serde::Serialize;

/// Outcome of an update pass
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePlan<R> {
    /// Sparse update payload, only changed slots are populated
    pub payload: R,

    /// Fields whose update function ran, in registry order
    pub changed_fields: Vec<FieldName>,

    /// Whether the caller should issue the remote update call
    pub has_changes: bool,
}

impl<R> UpdatePlan<R> {
    fn new(payload: R, changed_fields: Vec<FieldName>) -> Self {
        let has_changes = !changed_fields.is_empty();
        Self {
            payload,
            changed_fields,
            has_changes,
        }
    }

    pub fn summary(&self) -> String {
        if self.has_changes {
            format!("{} field(s) to update", self.changed_fields.len())
        } else {
            "no changes".to_string()
        }
    }
}

pub struct Reconciler<'a, R> {
    registry: &'a FieldRegistry<R>,
}

impl<'a, R: Default> Reconciler<'a, R> {
    pub fn new(registry: &'a FieldRegistry<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a FieldRegistry<R> {
        self.registry
    }

    /// Build a create payload
    ///
    /// Starts from `imported` when the resource is adopted from an existing
    /// remote object, otherwise from an empty one.
    pub fn on_create(&self, imported: Option<R>, handle: &ConfigHandle) -> Result<R> {
        let mut remote = imported.unwrap_or_default();
        for field in self.registry.iter() {
            if field.create(handle, &mut remote)? {
                tracing::debug!("{}: create [{}]", self.registry.name(), field.name());
            }
        }
        Ok(remote)
    }

    /// Flatten a fetched remote object into the handle's observed layer
    pub fn on_read(&self, remote: &R, handle: &mut ConfigHandle) -> Result<()> {
        for field in self.registry.iter() {
            if field.read(remote, handle)? {
                tracing::debug!("{}: read [{}]", self.registry.name(), field.name());
            }
        }
        Ok(())
    }

    /// Build a sparse update payload from the slots that changed
    ///
    /// All descriptors are visited. A changed slot whose desired value is
    /// absent is retracted by its update function.
    pub fn on_update(&self, handle: &ConfigHandle) -> Result<UpdatePlan<R>> {
        let mut payload = R::default();
        let mut changed_fields = Vec::new();

        for field in self.registry.iter() {
            if !field.has_update() || !handle.has_change(field.name()) {
                continue;
            }
            field.update(handle, &mut payload)?;
            tracing::debug!("{}: update [{}]", self.registry.name(), field.name());
            changed_fields.push(field.name());
        }

        let plan = UpdatePlan::new(payload, changed_fields);
        tracing::debug!("{}: {}", self.registry.name(), plan.summary());
        Ok(plan)
    }
}
