//! Ocean GKE launch spec resource lifecycle
//!
//! Wraps the reconciler around the remote API calls. Network access goes
//! through [`LaunchSpecApi`]; the field set itself never performs I/O.

use crate::error::{GcpError, Result};
use crate::fields::{self, NODE_POOL_NAME, OCEAN_ID};
use crate::launch_spec::LaunchSpec;
use crate::strategy;
use async_trait::async_trait;
use spotform_core::{ConfigHandle, FieldRegistry, Nullable, Reconciler};
use std::sync::LazyLock;

static REGISTRY: LazyLock<FieldRegistry<LaunchSpec>> = LazyLock::new(|| {
    let mut registry = FieldRegistry::new(fields::RESOURCE.as_str());
    fields::setup(&mut registry);
    strategy::setup(&mut registry);
    registry
});

/// Base fields plus the strategy extension
pub fn registry() -> &'static FieldRegistry<LaunchSpec> {
    &REGISTRY
}

/// Remote operations on Ocean GKE launch specs
#[async_trait]
pub trait LaunchSpecApi: Send + Sync {
    /// Create a launch spec and return it with its id
    async fn create(&self, spec: &LaunchSpec) -> Result<LaunchSpec>;

    /// Fetch a launch spec; `Ok(None)` when the API returns nothing
    async fn read(&self, id: &str) -> Result<Option<LaunchSpec>>;

    async fn update(&self, spec: &LaunchSpec) -> Result<LaunchSpec>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Build a launch spec from an existing GKE node pool
    async fn import(&self, ocean_id: &str, node_pool_name: &str) -> Result<LaunchSpec>;
}

pub struct LaunchSpecResource<A> {
    api: A,
    reconciler: Reconciler<'static, LaunchSpec>,
}

impl<A: LaunchSpecApi> LaunchSpecResource<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            reconciler: Reconciler::new(registry()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn create(&self, handle: &mut ConfigHandle) -> Result<()> {
        tracing::info!("onCreate() -> {}: starting create", fields::RESOURCE);

        let imported = match handle.get_str(NODE_POOL_NAME) {
            Some(node_pool) => {
                let ocean_id = handle.get_str(OCEAN_ID).unwrap_or_default();
                tracing::info!("importing node pool {} of {}", node_pool, ocean_id);
                Some(self.api.import(ocean_id, node_pool).await?)
            }
            None => None,
        };

        let spec = self.reconciler.on_create(imported, handle)?;
        tracing::debug!(
            "launch spec create configuration: {}",
            serde_json::to_string(&spec)?
        );

        let created = self.api.create(&spec).await?;
        let id = created.id().ok_or(GcpError::MissingId)?;
        handle.set_id(id);

        self.read(handle).await
    }

    /// Refresh the observed state; a vanished launch spec clears the id
    pub async fn read(&self, handle: &mut ConfigHandle) -> Result<()> {
        let id = handle.id().ok_or(GcpError::MissingId)?.to_string();
        tracing::info!("onRead() -> {}: reading {}", fields::RESOURCE, id);

        let spec = match self.api.read(&id).await {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                tracing::info!("launch spec {} not found, clearing id", id);
                handle.clear_id();
                return Ok(());
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("launch spec {} is gone ({}), clearing id", id, e);
                handle.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.reconciler.on_read(&spec, handle)?;
        tracing::info!("launch spec {} read successfully", id);
        Ok(())
    }

    pub async fn update(&self, handle: &mut ConfigHandle) -> Result<()> {
        let id = handle.id().ok_or(GcpError::MissingId)?.to_string();
        tracing::info!("onUpdate() -> {}: updating {}", fields::RESOURCE, id);

        let plan = self.reconciler.on_update(handle)?;
        if plan.has_changes {
            let mut spec = plan.payload;
            spec.id = Nullable::Value(id.clone());
            tracing::debug!(
                "launch spec update configuration: {}",
                serde_json::to_string(&spec)?
            );
            self.api.update(&spec).await?;
            tracing::info!("launch spec {} updated successfully", id);
        } else {
            tracing::info!("launch spec {} has no changes", id);
        }

        self.read(handle).await
    }

    pub async fn delete(&self, handle: &mut ConfigHandle) -> Result<()> {
        let id = handle.id().ok_or(GcpError::MissingId)?.to_string();
        tracing::info!("onDelete() -> {}: deleting {}", fields::RESOURCE, id);

        self.api.delete(&id).await?;
        handle.clear_id();
        tracing::info!("launch spec {} deleted successfully", id);
        Ok(())
    }
}
