//! `ocean_gke_launch_spec` base field set
//!
//! `ocean_id` and `source_image` are never retracted on update.
//! `node_pool_name` carries no expand or flatten functions: it only selects
//! the node pool imported before creation.

use crate::launch_spec::{KeyValue, LaunchSpec, Taint};
use spotform_core::nested::{self, block_str};
use spotform_core::schema::json_kind;
use spotform_core::{
    ConfigHandle, ConfigValue, Elem, FieldDescriptor, FieldName, FieldRegistry, Nullable,
    ReconcileError, ResourceType, Result, Schema, SchemaError,
};

pub const RESOURCE: ResourceType = ResourceType::new("ocean_gke_launch_spec");

pub const OCEAN_ID: FieldName = FieldName::new("ocean_id");
pub const NODE_POOL_NAME: FieldName = FieldName::new("node_pool_name");
pub const SOURCE_IMAGE: FieldName = FieldName::new("source_image");
pub const SERVICE_ACCOUNT: FieldName = FieldName::new("service_account");
pub const ROOT_VOLUME_SIZE: FieldName = FieldName::new("root_volume_size");
pub const INSTANCE_TYPES: FieldName = FieldName::new("instance_types");
pub const RESTRICT_SCALE_DOWN: FieldName = FieldName::new("restrict_scale_down");
pub const METADATA: FieldName = FieldName::new("metadata");
pub const LABELS: FieldName = FieldName::new("labels");
pub const TAINTS: FieldName = FieldName::new("taints");

pub const KEY: &str = "key";
pub const VALUE: &str = "value";
pub const EFFECT: &str = "effect";

pub fn setup(registry: &mut FieldRegistry<LaunchSpec>) {
    registry.register(
        FieldDescriptor::new(RESOURCE, OCEAN_ID, Schema::string().required())
            .with_read(read_ocean_id)
            .with_create(expand_ocean_id)
            .with_update(expand_ocean_id),
    );

    registry.register(FieldDescriptor::new(RESOURCE, NODE_POOL_NAME, Schema::string()));

    registry.register(
        FieldDescriptor::new(RESOURCE, SOURCE_IMAGE, Schema::string().computed())
            .with_read(read_source_image)
            .with_create(expand_source_image)
            .with_update(expand_source_image),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, SERVICE_ACCOUNT, Schema::string())
            .with_read(read_service_account)
            .with_create(create_service_account)
            .with_update(update_service_account),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, ROOT_VOLUME_SIZE, Schema::int())
            .with_read(read_root_volume_size)
            .with_create(create_root_volume_size)
            .with_update(update_root_volume_size),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, INSTANCE_TYPES, Schema::list(Elem::string()))
            .with_read(read_instance_types)
            .with_create(create_instance_types)
            .with_update(update_instance_types),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, RESTRICT_SCALE_DOWN, Schema::bool())
            .with_read(read_restrict_scale_down)
            .with_create(create_restrict_scale_down)
            .with_update(update_restrict_scale_down),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, METADATA, key_value_schema())
            .with_read(read_metadata)
            .with_create(create_metadata)
            .with_update(update_metadata)
            .with_deserializer(key_value_set),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, LABELS, key_value_schema())
            .with_read(read_labels)
            .with_create(create_labels)
            .with_update(update_labels)
            .with_deserializer(key_value_set),
    );

    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            TAINTS,
            Schema::set(Elem::block([
                (KEY, Schema::string().required()),
                (VALUE, Schema::string().required()),
                (EFFECT, Schema::string().required()),
            ])),
        )
        .with_read(read_taints)
        .with_create(create_taints)
        .with_update(update_taints),
    );
}

fn key_value_schema() -> Schema {
    Schema::set(Elem::block([
        (KEY, Schema::string().required()),
        (VALUE, Schema::string().required()),
    ]))
}

/// Accepts `{"k": "v"}` as well as the list-of-blocks form
fn key_value_set(
    schema: &Schema,
    path: &str,
    raw: &serde_json::Value,
) -> std::result::Result<ConfigValue, SchemaError> {
    let Some(object) = raw.as_object() else {
        return schema.decode(path, raw);
    };
    let mut items = Vec::with_capacity(object.len());
    for (key, value) in object {
        let Some(value) = value.as_str() else {
            return Err(SchemaError::TypeMismatch {
                path: format!("{}.{}", path, key),
                expected: "string",
                found: json_kind(value),
            });
        };
        items.push(ConfigValue::block([
            (KEY, ConfigValue::from(key.as_str())),
            (VALUE, ConfigValue::from(value)),
        ]));
    }
    Ok(ConfigValue::Set(items))
}

fn text(slot: &Nullable<String>) -> String {
    slot.value().cloned().unwrap_or_default()
}

// ---- ocean_id / source_image ----

fn read_ocean_id(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    handle.set_field(OCEAN_ID, text(&spec.ocean_id))
}

fn expand_ocean_id(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(v) = handle.get_str(OCEAN_ID) {
        spec.ocean_id = Nullable::Value(v.to_string());
    }
    Ok(())
}

fn read_source_image(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    handle.set_field(SOURCE_IMAGE, text(&spec.source_image))
}

fn expand_source_image(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(v) = handle.get_str(SOURCE_IMAGE) {
        spec.source_image = Nullable::Value(v.to_string());
    }
    Ok(())
}

// ---- service_account ----

fn read_service_account(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    handle.set_field(SERVICE_ACCOUNT, text(&spec.service_account))
}

fn create_service_account(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(v) = handle.get_str(SERVICE_ACCOUNT) {
        spec.service_account = Nullable::Value(v.to_string());
    }
    Ok(())
}

fn update_service_account(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.service_account
        .set(handle.get_str(SERVICE_ACCOUNT).map(str::to_string));
    Ok(())
}

// ---- root_volume_size ----

fn read_root_volume_size(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    let value = spec.root_volume_size.value().copied().unwrap_or_default();
    handle.set_field(ROOT_VOLUME_SIZE, value)
}

fn create_root_volume_size(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(v) = handle.get_int(ROOT_VOLUME_SIZE).filter(|v| *v > 0) {
        spec.root_volume_size = Nullable::Value(v);
    }
    Ok(())
}

fn update_root_volume_size(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.root_volume_size
        .set(handle.get_int(ROOT_VOLUME_SIZE).filter(|v| *v > 0));
    Ok(())
}

// ---- instance_types ----

fn read_instance_types(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    let types = spec.instance_types.value().cloned().unwrap_or_default();
    handle.set_field(INSTANCE_TYPES, ConfigValue::string_list(types))
}

fn expand_instance_types(handle: &ConfigHandle) -> Result<Option<Vec<String>>> {
    let Some(value) = handle.get_ok(INSTANCE_TYPES) else {
        return Ok(None);
    };
    let types = nested::expect_items(INSTANCE_TYPES, value)?
        .iter()
        .filter_map(|item| {
            let name = item.as_str();
            if name.is_none() {
                tracing::debug!("[{}]: skipping {} element", INSTANCE_TYPES, item.kind());
            }
            name.map(str::to_string)
        })
        .collect();
    Ok(Some(types))
}

fn create_instance_types(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(types) = expand_instance_types(handle)? {
        spec.instance_types = Nullable::Value(types);
    }
    Ok(())
}

fn update_instance_types(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.instance_types.set(expand_instance_types(handle)?);
    Ok(())
}

// ---- restrict_scale_down ----

fn read_restrict_scale_down(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    let value = spec.restrict_scale_down.value().copied().unwrap_or_default();
    handle.set_field(RESTRICT_SCALE_DOWN, value)
}

fn create_restrict_scale_down(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(v) = handle.get_bool(RESTRICT_SCALE_DOWN) {
        spec.restrict_scale_down = Nullable::Value(v);
    }
    Ok(())
}

fn update_restrict_scale_down(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.restrict_scale_down
        .set(handle.get_bool(RESTRICT_SCALE_DOWN));
    Ok(())
}

// ---- metadata / labels ----

fn flatten_key_values(items: &Nullable<Vec<KeyValue>>) -> ConfigValue {
    ConfigValue::Set(
        items
            .value()
            .map(|items| {
                items
                    .iter()
                    .map(|kv| {
                        ConfigValue::block([
                            (KEY, ConfigValue::from(kv.key.as_str())),
                            (VALUE, ConfigValue::from(kv.value.as_str())),
                        ])
                    })
                    .collect()
            })
            .unwrap_or_default(),
    )
}

fn expand_key_values(field: FieldName, handle: &ConfigHandle) -> Result<Option<Vec<KeyValue>>> {
    let Some(value) = handle.get_ok(field) else {
        return Ok(None);
    };
    let items = nested::blocks(field, Some(value))?
        .into_iter()
        .map(|block| {
            KeyValue::new(
                block_str(block, KEY).unwrap_or_default(),
                block_str(block, VALUE).unwrap_or_default(),
            )
        })
        .collect();
    Ok(Some(items))
}

fn read_metadata(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    handle.set_field(METADATA, flatten_key_values(&spec.metadata))
}

fn create_metadata(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(items) = expand_key_values(METADATA, handle)? {
        spec.metadata = Nullable::Value(items);
    }
    Ok(())
}

fn update_metadata(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.metadata.set(expand_key_values(METADATA, handle)?);
    Ok(())
}

fn read_labels(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    handle.set_field(LABELS, flatten_key_values(&spec.labels))
}

fn create_labels(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(items) = expand_key_values(LABELS, handle)? {
        spec.labels = Nullable::Value(items);
    }
    Ok(())
}

fn update_labels(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.labels.set(expand_key_values(LABELS, handle)?);
    Ok(())
}

// ---- taints ----

fn read_taints(spec: &LaunchSpec, handle: &mut ConfigHandle) -> Result<()> {
    let taints = spec
        .taints
        .value()
        .map(|taints| {
            taints
                .iter()
                .map(|t| {
                    ConfigValue::block([
                        (KEY, ConfigValue::from(t.key.as_str())),
                        (VALUE, ConfigValue::from(t.value.as_str())),
                        (EFFECT, ConfigValue::from(t.effect.as_str())),
                    ])
                })
                .collect()
        })
        .unwrap_or_default();
    handle.set_field(TAINTS, ConfigValue::Set(taints))
}

fn expand_taints(handle: &ConfigHandle) -> Result<Option<Vec<Taint>>> {
    let Some(value) = handle.get_ok(TAINTS) else {
        return Ok(None);
    };
    nested::blocks(TAINTS, Some(value))?
        .into_iter()
        .map(|block| -> Result<Taint> {
            let effect = block_str(block, EFFECT).ok_or_else(|| {
                ReconcileError::parse(
                    TAINTS,
                    SchemaError::MissingRequired {
                        path: format!("{}.{}", TAINTS, EFFECT),
                    },
                )
            })?;
            Ok(Taint {
                key: block_str(block, KEY).unwrap_or_default().to_string(),
                value: block_str(block, VALUE).unwrap_or_default().to_string(),
                effect: effect.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn create_taints(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    if let Some(taints) = expand_taints(handle)? {
        spec.taints = Nullable::Value(taints);
    }
    Ok(())
}

fn update_taints(handle: &ConfigHandle, spec: &mut LaunchSpec) -> Result<()> {
    spec.taints.set(expand_taints(handle)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spotform_core::Reconciler;

    fn registry() -> FieldRegistry<LaunchSpec> {
        let mut registry = FieldRegistry::new(RESOURCE.as_str());
        setup(&mut registry);
        registry
    }

    #[test]
    fn test_labels_accept_plain_object() {
        let registry = registry();
        let handle = registry
            .decode_config(&json!({"ocean_id": "o-1", "labels": {"team": "infra"}}))
            .unwrap();
        let spec = Reconciler::new(&registry).on_create(None, &handle).unwrap();
        assert_eq!(spec.labels, Nullable::Value(vec![KeyValue::new("team", "infra")]));
    }

    #[test]
    fn test_labels_accept_block_list() {
        let registry = registry();
        let handle = registry
            .decode_config(&json!({
                "ocean_id": "o-1",
                "metadata": [{"key": "gci-update-strategy", "value": "update_disabled"}]
            }))
            .unwrap();
        let spec = Reconciler::new(&registry).on_create(None, &handle).unwrap();
        assert_eq!(
            spec.metadata,
            Nullable::Value(vec![KeyValue::new("gci-update-strategy", "update_disabled")])
        );
    }

    #[test]
    fn test_label_values_must_be_strings() {
        let err = registry()
            .decode_config(&json!({"ocean_id": "o-1", "labels": {"tier": 1}}))
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Schema(SchemaError::TypeMismatch { expected: "string", found: "int", .. })
        ));
    }

    #[test]
    fn test_node_pool_name_is_not_sent() {
        let registry = registry();
        let handle = registry
            .decode_config(&json!({"ocean_id": "o-1", "node_pool_name": "default-pool"}))
            .unwrap();
        let spec = Reconciler::new(&registry).on_create(None, &handle).unwrap();
        let payload = serde_json::to_value(&spec).unwrap();
        assert_eq!(payload, json!({"oceanId": "o-1"}));
    }

    #[test]
    fn test_update_retracts_labels_but_not_source_image() {
        let registry = registry();
        let reconciler = Reconciler::new(&registry);
        let remote = LaunchSpec {
            ocean_id: Nullable::Value("o-1".to_string()),
            source_image: Nullable::Value("cos-stable".to_string()),
            labels: Nullable::Value(vec![KeyValue::new("team", "infra")]),
            ..Default::default()
        };

        let mut handle = registry.decode_config(&json!({"ocean_id": "o-1"})).unwrap();
        reconciler.on_read(&remote, &mut handle).unwrap();
        let plan = reconciler.on_update(&handle).unwrap();

        // computed and not configured: no diff
        assert_eq!(plan.changed_fields, vec![LABELS]);
        assert!(plan.payload.labels.is_null());
        assert!(plan.payload.source_image.is_unset());
    }

    #[test]
    fn test_taints_round_trip() {
        let registry = registry();
        let reconciler = Reconciler::new(&registry);
        let mut handle = registry
            .decode_config(&json!({
                "ocean_id": "o-1",
                "taints": [{"key": "dedicated", "value": "gpu", "effect": "NoSchedule"}]
            }))
            .unwrap();

        let spec = reconciler.on_create(None, &handle).unwrap();
        assert_eq!(spec.taints.value().map(Vec::len), Some(1));

        reconciler.on_read(&spec, &mut handle).unwrap();
        assert!(!reconciler.on_update(&handle).unwrap().has_changes);
    }
}
