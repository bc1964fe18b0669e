//! `ocean_gke_launch_spec_strategy` extension field set

use crate::launch_spec::{LaunchSpec, Strategy};
use spotform_core::nested::{self, block_count, single_block};
use spotform_core::{
    ConfigHandle, ConfigMap, ConfigValue, Elem, FieldDescriptor, FieldName, FieldRegistry,
    Nullable, ResourceType, Result, Schema,
};

pub const RESOURCE: ResourceType = ResourceType::new("ocean_gke_launch_spec_strategy");

pub const STRATEGY: FieldName = FieldName::new("strategy");

pub const PREEMPTIBLE_PERCENTAGE: &str = "preemptible_percentage";

pub fn setup(registry: &mut FieldRegistry<LaunchSpec>) {
    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            STRATEGY,
            Schema::list(Elem::block([(PREEMPTIBLE_PERCENTAGE, Schema::int())])).max_items(1),
        )
        .with_read(read_strategy)
        .with_create(create_strategy)
        .with_update(update_strategy),
    );
}

fn read_strategy(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    let value = match spec.strategy.value() {
        Some(strategy) => single_block(ConfigMap::from([(
            PREEMPTIBLE_PERCENTAGE.to_string(),
            ConfigValue::Int(
                strategy
                    .preemptible_percentage
                    .value()
                    .copied()
                    .unwrap_or_default(),
            ),
        )])),
        None => ConfigValue::List(Vec::new()),
    };
    handle.set_field(STRATEGY, value)
}

fn expand_strategy(handle: &ConfigHandle) -> Result<Option<Strategy>> {
    let Some(block) = nested::first_block(STRATEGY, handle.get(STRATEGY))? else {
        return Ok(None);
    };
    let mut strategy = Strategy::default();
    strategy
        .preemptible_percentage
        .set(block_count(&block, PREEMPTIBLE_PERCENTAGE));
    Ok(Some(strategy))
}

fn create_strategy(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(strategy) = expand_strategy(handle)? {
        spec.strategy = Nullable::Value(strategy);
    }
    Ok(())
}

fn update_strategy(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.strategy.set(expand_strategy(handle)?);
    Ok(())
}
