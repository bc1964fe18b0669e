//! `elastigroup_aws_launch_configuration` field set
//!
//! Maps the launch configuration block of an Elastigroup onto
//! `compute.launchSpecification`. Image id, security groups and
//! EBS optimization are never retracted on update: the API requires the
//! first two and computes the third.

use crate::elastigroup::{
    CpuOptions, CreditSpecification, Elastigroup, IamInstanceProfile, MetadataOptions,
    ResourceTagSpecification, ShouldTag,
};
use regex::Regex;
use spotform_core::encoding::{self, Identifier};
use spotform_core::nested::{self, block_bool, block_count, block_str, single_block};
use spotform_core::{
    ConfigHandle, ConfigMap, ConfigValue, Elem, FieldDescriptor, FieldName, FieldRegistry,
    Nullable, ReconcileError, ResourceType, Result, Schema, SchemaError,
};
use std::sync::LazyLock;

pub const RESOURCE: ResourceType = ResourceType::new("elastigroup_aws_launch_configuration");

pub const IMAGE_ID: FieldName = FieldName::new("image_id");
pub const IAM_INSTANCE_PROFILE: FieldName = FieldName::new("iam_instance_profile");
pub const KEY_NAME: FieldName = FieldName::new("key_name");
pub const SECURITY_GROUPS: FieldName = FieldName::new("security_groups");
pub const USER_DATA: FieldName = FieldName::new("user_data");
pub const SHUTDOWN_SCRIPT: FieldName = FieldName::new("shutdown_script");
pub const ENABLE_MONITORING: FieldName = FieldName::new("enable_monitoring");
pub const EBS_OPTIMIZED: FieldName = FieldName::new("ebs_optimized");
pub const PLACEMENT_TENANCY: FieldName = FieldName::new("placement_tenancy");
pub const CPU_CREDITS: FieldName = FieldName::new("cpu_credits");
pub const METADATA_OPTIONS: FieldName = FieldName::new("metadata_options");
pub const CPU_OPTIONS: FieldName = FieldName::new("cpu_options");
pub const RESOURCE_TAG_SPECIFICATION: FieldName = FieldName::new("resource_tag_specification");

// metadata_options
pub const HTTP_TOKENS: &str = "http_tokens";
pub const HTTP_PUT_RESPONSE_HOP_LIMIT: &str = "http_put_response_hop_limit";

// cpu_options
pub const THREADS_PER_CORE: &str = "threads_per_core";

// resource_tag_specification
pub const SHOULD_TAG_VOLUMES: &str = "should_tag_volumes";
pub const SHOULD_TAG_SNAPSHOTS: &str = "should_tag_snapshots";
pub const SHOULD_TAG_ENIS: &str = "should_tag_enis";
pub const SHOULD_TAG_AMIS: &str = "should_tag_amis";

pub static INSTANCE_PROFILE_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"arn:aws:iam::\d{12}:instance-profile/?[a-zA-Z_0-9+=,.@\-_/]+")
        .expect("instance profile ARN pattern is valid")
});

static REGISTRY: LazyLock<FieldRegistry<Elastigroup>> = LazyLock::new(|| {
    let mut registry = FieldRegistry::new(RESOURCE.as_str());
    setup(&mut registry);
    registry
});

/// Shared registry of the launch configuration fields
pub fn registry() -> &'static FieldRegistry<Elastigroup> {
    &REGISTRY
}

pub fn setup(registry: &mut FieldRegistry<Elastigroup>) {
    registry.register(
        FieldDescriptor::new(RESOURCE, IMAGE_ID, Schema::string())
            .with_read(read_image_id)
            .with_create(expand_image_id)
            .with_update(expand_image_id),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, IAM_INSTANCE_PROFILE, Schema::string())
            .with_read(read_iam_instance_profile)
            .with_create(create_iam_instance_profile)
            .with_update(update_iam_instance_profile),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, KEY_NAME, Schema::string())
            .with_read(read_key_name)
            .with_create(create_key_name)
            .with_update(update_key_name),
    );

    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            SECURITY_GROUPS,
            Schema::list(Elem::string()).required(),
        )
        .with_read(read_security_groups)
        .with_create(expand_security_groups)
        .with_update(expand_security_groups),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, USER_DATA, binary_text_schema())
            .with_read(read_user_data)
            .with_create(create_user_data)
            .with_update(update_user_data),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, SHUTDOWN_SCRIPT, binary_text_schema())
            .with_read(read_shutdown_script)
            .with_create(create_shutdown_script)
            .with_update(update_shutdown_script),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, ENABLE_MONITORING, Schema::bool().with_default(false))
            .with_read(read_enable_monitoring)
            .with_create(expand_enable_monitoring)
            .with_update(expand_enable_monitoring),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, EBS_OPTIMIZED, Schema::bool().computed())
            .with_read(read_ebs_optimized)
            .with_create(expand_ebs_optimized)
            .with_update(expand_ebs_optimized),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, PLACEMENT_TENANCY, Schema::string())
            .with_read(read_placement_tenancy)
            .with_create(create_placement_tenancy)
            .with_update(update_placement_tenancy),
    );

    registry.register(
        FieldDescriptor::new(RESOURCE, CPU_CREDITS, Schema::string())
            .with_read(read_cpu_credits)
            .with_create(create_cpu_credits)
            .with_update(update_cpu_credits),
    );

    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            METADATA_OPTIONS,
            Schema::list(Elem::block([
                (HTTP_TOKENS, Schema::string().required()),
                (HTTP_PUT_RESPONSE_HOP_LIMIT, Schema::int()),
            ]))
            .max_items(1),
        )
        .with_read(read_metadata_options)
        .with_create(create_metadata_options)
        .with_update(update_metadata_options),
    );

    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            CPU_OPTIONS,
            Schema::list(Elem::block([(THREADS_PER_CORE, Schema::int().required())]))
                .max_items(1),
        )
        .with_read(read_cpu_options)
        .with_create(create_cpu_options)
        .with_update(update_cpu_options),
    );

    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            RESOURCE_TAG_SPECIFICATION,
            Schema::list(Elem::block([
                (SHOULD_TAG_VOLUMES, Schema::bool()),
                (SHOULD_TAG_AMIS, Schema::bool()),
                (SHOULD_TAG_ENIS, Schema::bool()),
                (SHOULD_TAG_SNAPSHOTS, Schema::bool()),
            ]))
            .max_items(1),
        )
        .with_read(read_resource_tag_specification)
        .with_create(create_resource_tag_specification)
        .with_update(update_resource_tag_specification),
    );
}

fn binary_text_schema() -> Schema {
    Schema::string()
        .with_state_func(encoding::base64_state)
        .with_diff_suppress(encoding::suppress_empty_sha1)
}

fn string_of(value: &Nullable<String>) -> String {
    value.value().cloned().unwrap_or_default()
}

// ---- image_id ----

fn read_image_id(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .map(|spec| string_of(&spec.image_id))
        .unwrap_or_default();
    handle.set_field(IMAGE_ID, value)
}

fn expand_image_id(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(IMAGE_ID) {
        group.launch_spec_mut().image_id = Nullable::Value(v.to_string());
    }
    Ok(())
}

// ---- iam_instance_profile ----

fn read_iam_instance_profile(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .and_then(|spec| spec.iam_instance_profile.value())
        .and_then(|profile| profile.arn.value().or(profile.name.value()))
        .cloned()
        .unwrap_or_default();
    handle.set_field(IAM_INSTANCE_PROFILE, value)
}

fn expand_instance_profile(value: &str) -> IamInstanceProfile {
    let mut profile = IamInstanceProfile::default();
    match Identifier::classify(value, &INSTANCE_PROFILE_ARN) {
        Identifier::Arn(arn) => profile.arn = Nullable::Value(arn.to_string()),
        Identifier::Name(name) => profile.name = Nullable::Value(name.to_string()),
    }
    profile
}

fn create_iam_instance_profile(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(IAM_INSTANCE_PROFILE) {
        group.launch_spec_mut().iam_instance_profile = Nullable::Value(expand_instance_profile(v));
    }
    Ok(())
}

fn update_iam_instance_profile(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = handle
        .get_str(IAM_INSTANCE_PROFILE)
        .map(expand_instance_profile);
    group.launch_spec_mut().iam_instance_profile.set(value);
    Ok(())
}

// ---- key_name ----

fn read_key_name(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .map(|spec| string_of(&spec.key_pair))
        .unwrap_or_default();
    handle.set_field(KEY_NAME, value)
}

fn create_key_name(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(KEY_NAME) {
        group.launch_spec_mut().key_pair = Nullable::Value(v.to_string());
    }
    Ok(())
}

fn update_key_name(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = handle.get_str(KEY_NAME).map(str::to_string);
    group.launch_spec_mut().key_pair.set(value);
    Ok(())
}

// ---- security_groups ----

fn read_security_groups(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let ids = group
        .launch_spec()
        .and_then(|spec| spec.security_group_ids.value())
        .cloned()
        .unwrap_or_default();
    handle.set_field(SECURITY_GROUPS, ConfigValue::string_list(ids))
}

fn expand_security_groups(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let Some(value) = handle.get(SECURITY_GROUPS) else {
        return Ok(());
    };
    let ids = nested::expect_items(SECURITY_GROUPS, value)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ReconcileError::parse(
                    SECURITY_GROUPS,
                    SchemaError::TypeMismatch {
                        path: format!("{}.{}", SECURITY_GROUPS, index),
                        expected: "string",
                        found: item.kind(),
                    },
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;
    group.launch_spec_mut().security_group_ids = Nullable::Value(ids);
    Ok(())
}

// ---- user_data / shutdown_script ----

fn read_binary_text(
    field: FieldName,
    remote: Option<&Nullable<String>>,
    handle: &mut ConfigHandle,
) -> Result<()> {
    let configured = handle
        .get(field)
        .and_then(ConfigValue::as_str)
        .unwrap_or_default();
    let value = encoding::decode_binary_text(
        remote.and_then(Nullable::value).map(String::as_str),
        configured,
    );
    handle.set_field(field, value)
}

fn read_user_data(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    read_binary_text(
        USER_DATA,
        group.launch_spec().map(|spec| &spec.user_data),
        handle,
    )
}

fn create_user_data(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(USER_DATA) {
        group.launch_spec_mut().user_data = Nullable::Value(encoding::base64_encode(v));
    }
    Ok(())
}

fn update_user_data(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = handle.get_str(USER_DATA).map(encoding::base64_encode);
    group.launch_spec_mut().user_data.set(value);
    Ok(())
}

fn read_shutdown_script(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    read_binary_text(
        SHUTDOWN_SCRIPT,
        group.launch_spec().map(|spec| &spec.shutdown_script),
        handle,
    )
}

fn create_shutdown_script(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(SHUTDOWN_SCRIPT) {
        group.launch_spec_mut().shutdown_script = Nullable::Value(encoding::base64_encode(v));
    }
    Ok(())
}

fn update_shutdown_script(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = handle.get_str(SHUTDOWN_SCRIPT).map(encoding::base64_encode);
    group.launch_spec_mut().shutdown_script.set(value);
    Ok(())
}

// ---- enable_monitoring / ebs_optimized ----

fn read_enable_monitoring(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .and_then(|spec| spec.monitoring.value().copied())
        .unwrap_or_default();
    handle.set_field(ENABLE_MONITORING, value)
}

fn expand_enable_monitoring(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_bool(ENABLE_MONITORING) {
        group.launch_spec_mut().monitoring = Nullable::Value(v);
    }
    Ok(())
}

fn read_ebs_optimized(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .and_then(|spec| spec.ebs_optimized.value().copied())
        .unwrap_or_default();
    handle.set_field(EBS_OPTIMIZED, value)
}

fn expand_ebs_optimized(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_bool(EBS_OPTIMIZED) {
        group.launch_spec_mut().ebs_optimized = Nullable::Value(v);
    }
    Ok(())
}

// ---- placement_tenancy ----

fn read_placement_tenancy(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .map(|spec| string_of(&spec.tenancy))
        .unwrap_or_default();
    handle.set_field(PLACEMENT_TENANCY, value)
}

fn create_placement_tenancy(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(PLACEMENT_TENANCY) {
        group.launch_spec_mut().tenancy = Nullable::Value(v.to_string());
    }
    Ok(())
}

fn update_placement_tenancy(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = handle.get_str(PLACEMENT_TENANCY).map(str::to_string);
    group.launch_spec_mut().tenancy.set(value);
    Ok(())
}

// ---- cpu_credits ----

fn read_cpu_credits(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = group
        .launch_spec()
        .and_then(|spec| spec.credit_specification.value())
        .map(|credits| string_of(&credits.cpu_credits))
        .unwrap_or_default();
    handle.set_field(CPU_CREDITS, value)
}

fn create_cpu_credits(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(v) = handle.get_str(CPU_CREDITS) {
        group
            .launch_spec_mut()
            .credit_specification
            .get_or_insert_with(CreditSpecification::default)
            .cpu_credits = Nullable::Value(v.to_string());
    }
    Ok(())
}

/// Replaces the whole credit specification, or clears it
fn update_cpu_credits(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = handle.get_str(CPU_CREDITS).map(|v| CreditSpecification {
        cpu_credits: Nullable::Value(v.to_string()),
    });
    group.launch_spec_mut().credit_specification.set(value);
    Ok(())
}

// ---- metadata_options ----

fn read_metadata_options(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = match group
        .launch_spec()
        .and_then(|spec| spec.metadata_options.value())
    {
        Some(options) => single_block(ConfigMap::from([
            (HTTP_TOKENS.to_string(), string_of(&options.http_tokens).into()),
            (
                HTTP_PUT_RESPONSE_HOP_LIMIT.to_string(),
                options
                    .http_put_response_hop_limit
                    .value()
                    .copied()
                    .unwrap_or_default()
                    .into(),
            ),
        ])),
        None => ConfigValue::List(Vec::new()),
    };
    handle.set_field(METADATA_OPTIONS, value)
}

fn expand_metadata_options(handle: &ConfigHandle) -> Result<Option<MetadataOptions>> {
    let Some(block) = nested::first_block(METADATA_OPTIONS, handle.get(METADATA_OPTIONS))? else {
        return Ok(None);
    };
    let mut options = MetadataOptions::default();
    if let Some(v) = block_str(&block, HTTP_TOKENS) {
        options.http_tokens = Nullable::Value(v.to_string());
    }
    options
        .http_put_response_hop_limit
        .set(block_count(&block, HTTP_PUT_RESPONSE_HOP_LIMIT));
    Ok(Some(options))
}

fn create_metadata_options(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(options) = expand_metadata_options(handle)? {
        group.launch_spec_mut().metadata_options = Nullable::Value(options);
    }
    Ok(())
}

fn update_metadata_options(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = expand_metadata_options(handle)?;
    group.launch_spec_mut().metadata_options.set(value);
    Ok(())
}

// ---- cpu_options ----

fn read_cpu_options(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let value = match group.launch_spec().and_then(|spec| spec.cpu_options.value()) {
        Some(options) => single_block(ConfigMap::from([(
            THREADS_PER_CORE.to_string(),
            options
                .threads_per_core
                .value()
                .copied()
                .unwrap_or_default()
                .into(),
        )])),
        None => ConfigValue::List(Vec::new()),
    };
    handle.set_field(CPU_OPTIONS, value)
}

fn expand_cpu_options(handle: &ConfigHandle) -> Result<Option<CpuOptions>> {
    let Some(block) = nested::first_block(CPU_OPTIONS, handle.get(CPU_OPTIONS))? else {
        return Ok(None);
    };
    let mut options = CpuOptions::default();
    options
        .threads_per_core
        .set(block_count(&block, THREADS_PER_CORE));
    Ok(Some(options))
}

fn create_cpu_options(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(options) = expand_cpu_options(handle)? {
        group.launch_spec_mut().cpu_options = Nullable::Value(options);
    }
    Ok(())
}

fn update_cpu_options(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = expand_cpu_options(handle)?;
    group.launch_spec_mut().cpu_options.set(value);
    Ok(())
}

// ---- resource_tag_specification ----

fn read_resource_tag_specification(group: &Elastigroup, handle: &mut ConfigHandle) -> Result<()> {
    let Some(spec) = group
        .launch_spec()
        .and_then(|spec| spec.resource_tag_specification.value())
    else {
        return handle.set_field(RESOURCE_TAG_SPECIFICATION, ConfigValue::List(Vec::new()));
    };

    let mut block = ConfigMap::new();
    for (key, slot) in [
        (SHOULD_TAG_SNAPSHOTS, &spec.snapshots),
        (SHOULD_TAG_ENIS, &spec.enis),
        (SHOULD_TAG_AMIS, &spec.amis),
        (SHOULD_TAG_VOLUMES, &spec.volumes),
    ] {
        if let Some(tag) = slot.value() {
            block.insert(key.to_string(), tag.get().into());
        }
    }
    handle.set_field(RESOURCE_TAG_SPECIFICATION, single_block(block))
}

fn expand_resource_tag_specification(
    handle: &ConfigHandle,
) -> Result<Option<ResourceTagSpecification>> {
    let Some(block) = nested::first_block(
        RESOURCE_TAG_SPECIFICATION,
        handle.get(RESOURCE_TAG_SPECIFICATION),
    )?
    else {
        return Ok(None);
    };

    let tag = |key: &str| match block_bool(&block, key) {
        Some(v) => Nullable::Value(ShouldTag::new(v)),
        None => Nullable::Unset,
    };
    Ok(Some(ResourceTagSpecification {
        volumes: tag(SHOULD_TAG_VOLUMES),
        snapshots: tag(SHOULD_TAG_SNAPSHOTS),
        enis: tag(SHOULD_TAG_ENIS),
        amis: tag(SHOULD_TAG_AMIS),
    }))
}

fn create_resource_tag_specification(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    if let Some(spec) = expand_resource_tag_specification(handle)? {
        group.launch_spec_mut().resource_tag_specification = Nullable::Value(spec);
    }
    Ok(())
}

fn update_resource_tag_specification(handle: &ConfigHandle, group: &mut Elastigroup) -> Result<()> {
    let value = expand_resource_tag_specification(handle)?;
    group.launch_spec_mut().resource_tag_specification.set(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spotform_core::Reconciler;

    fn config(document: serde_json::Value) -> ConfigHandle {
        registry().decode_config(&document).unwrap()
    }

    #[test]
    fn test_registry_order_and_schema() {
        let names = registry().field_names();
        assert_eq!(names.first(), Some(&IMAGE_ID));
        assert_eq!(names.last(), Some(&RESOURCE_TAG_SPECIFICATION));
        assert_eq!(names.len(), 13);

        let schema = registry().schema_map();
        assert!(schema["security_groups"].required);
        assert!(schema["ebs_optimized"].computed);
        assert_eq!(schema["metadata_options"].max_items, Some(1));
    }

    #[test]
    fn test_image_id_create_then_read() {
        let handle = config(json!({"image_id": "ami-123", "security_groups": ["sg-1"]}));
        let reconciler = Reconciler::new(registry());

        let group = reconciler.on_create(None, &handle).unwrap();
        assert_eq!(
            group.launch_spec().unwrap().image_id,
            Nullable::Value("ami-123".to_string())
        );

        let mut observed = registry().handle();
        reconciler.on_read(&group, &mut observed).unwrap();
        assert_eq!(observed.observed_value(IMAGE_ID), Some(&ConfigValue::from("ami-123")));
    }

    #[test]
    fn test_iam_instance_profile_classification() {
        let arn = "arn:aws:iam::123456789012:instance-profile/web";
        let reconciler = Reconciler::new(registry());

        let group = reconciler
            .on_create(None, &config(json!({"security_groups": [], "iam_instance_profile": arn})))
            .unwrap();
        let profile = group.launch_spec().unwrap().iam_instance_profile.value().unwrap();
        assert_eq!(profile.arn, Nullable::Value(arn.to_string()));
        assert!(profile.name.is_unset());

        let group = reconciler
            .on_create(None, &config(json!({"security_groups": [], "iam_instance_profile": "web"})))
            .unwrap();
        let profile = group.launch_spec().unwrap().iam_instance_profile.value().unwrap();
        assert_eq!(profile.name, Nullable::Value("web".to_string()));
        assert!(profile.arn.is_unset());
    }

    #[test]
    fn test_read_prefers_arn_over_name() {
        let mut group = Elastigroup::default();
        group.launch_spec_mut().iam_instance_profile = Nullable::Value(IamInstanceProfile {
            arn: Nullable::Value("arn:aws:iam::123456789012:instance-profile/web".to_string()),
            name: Nullable::Value("web".to_string()),
        });

        let mut handle = registry().handle();
        read_iam_instance_profile(&group, &mut handle).unwrap();
        assert_eq!(
            handle.observed_value(IAM_INSTANCE_PROFILE),
            Some(&ConfigValue::from("arn:aws:iam::123456789012:instance-profile/web"))
        );
    }

    #[test]
    fn test_cpu_credits_retracted_on_update() {
        let reconciler = Reconciler::new(registry());
        let mut group = Elastigroup::default();
        group.launch_spec_mut().credit_specification = Nullable::Value(CreditSpecification {
            cpu_credits: Nullable::Value("unlimited".to_string()),
        });

        let mut handle = config(json!({"security_groups": []}));
        reconciler.on_read(&group, &mut handle).unwrap();

        let plan = reconciler.on_update(&handle).unwrap();
        assert!(plan.has_changes);
        assert!(plan.changed_fields.contains(&CPU_CREDITS));
        assert!(
            plan.payload
                .launch_spec()
                .unwrap()
                .credit_specification
                .is_null()
        );
        let payload = serde_json::to_value(&plan.payload).unwrap();
        assert_eq!(
            payload["compute"]["launchSpecification"]["creditSpecification"],
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_image_id_is_not_retracted() {
        let mut handle = registry().handle();
        let mut group = Elastigroup::default();
        expand_image_id(&handle, &mut group).unwrap();
        assert!(group.launch_spec().is_none());

        handle.set_desired(IMAGE_ID.as_str(), "ami-456");
        expand_image_id(&handle, &mut group).unwrap();
        assert_eq!(
            group.launch_spec().unwrap().image_id,
            Nullable::Value("ami-456".to_string())
        );
    }

    #[test]
    fn test_user_data_is_encoded_once() {
        let reconciler = Reconciler::new(registry());
        let handle = config(json!({"security_groups": [], "user_data": "echo hi"}));
        let group = reconciler.on_create(None, &handle).unwrap();
        let encoded = encoding::base64_encode("echo hi");
        assert_eq!(group.launch_spec().unwrap().user_data, Nullable::Value(encoded.clone()));

        let mut observed = handle.clone();
        reconciler.on_read(&group, &mut observed).unwrap();
        assert_eq!(observed.observed_value(USER_DATA), Some(&ConfigValue::from(encoded)));
        assert!(!observed.has_change(USER_DATA));
    }

    #[test]
    fn test_user_data_empty_sha1_reads_as_empty() {
        let mut group = Elastigroup::default();
        group.launch_spec_mut().user_data = Nullable::Value(encoding::EMPTY_SHA1.to_string());

        let mut handle = config(json!({"security_groups": []}));
        read_user_data(&group, &mut handle).unwrap();
        assert_eq!(handle.observed_value(USER_DATA), Some(&ConfigValue::from("")));
        assert!(!handle.has_change(USER_DATA));
    }

    #[test]
    fn test_metadata_options_cap_one() {
        let reconciler = Reconciler::new(registry());

        // zero elements leave the slot unset
        let group = reconciler
            .on_create(None, &config(json!({"security_groups": [], "metadata_options": []})))
            .unwrap();
        assert!(group.launch_spec().unwrap().metadata_options.is_unset());

        // one element is expanded
        let group = reconciler
            .on_create(
                None,
                &config(json!({
                    "security_groups": [],
                    "metadata_options": [{"http_tokens": "required", "http_put_response_hop_limit": 2}]
                })),
            )
            .unwrap();
        let options = group.launch_spec().unwrap().metadata_options.value().unwrap();
        assert_eq!(options.http_tokens, Nullable::Value("required".to_string()));
        assert_eq!(options.http_put_response_hop_limit, Nullable::Value(2));

        // more are rejected by the schema
        let err = registry()
            .decode_config(&json!({
                "security_groups": [],
                "metadata_options": [{"http_tokens": "required"}, {"http_tokens": "optional"}]
            }))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Schema(SchemaError::TooManyItems { max: 1, .. })));
    }

    #[test]
    fn test_malformed_cap_one_element_expands_to_defaults() {
        let handle = registry()
            .handle()
            .with_desired(CPU_OPTIONS.as_str(), ConfigValue::List(vec!["oops".into()]));
        let mut group = Elastigroup::default();
        create_cpu_options(&handle, &mut group).unwrap();

        let options = group.launch_spec().unwrap().cpu_options.value().unwrap();
        assert!(options.threads_per_core.is_null());
    }

    #[test]
    fn test_security_groups_shape_error() {
        let handle = registry()
            .handle()
            .with_desired(SECURITY_GROUPS.as_str(), "sg-1");
        let err = expand_security_groups(&handle, &mut Elastigroup::default()).unwrap_err();
        assert_eq!(err.field(), Some(SECURITY_GROUPS));
        assert!(matches!(err, ReconcileError::FieldParse { .. }));
    }

    #[test]
    fn test_resource_tag_specification_round_trip() {
        let reconciler = Reconciler::new(registry());
        let handle = config(json!({
            "security_groups": ["sg-1"],
            "resource_tag_specification": [{"should_tag_volumes": true, "should_tag_amis": false}]
        }));

        let group = reconciler.on_create(None, &handle).unwrap();
        let spec = group
            .launch_spec()
            .unwrap()
            .resource_tag_specification
            .value()
            .unwrap();
        assert!(spec.volumes.value().unwrap().get());
        assert!(spec.enis.is_unset());

        let mut observed = handle.clone();
        reconciler.on_read(&group, &mut observed).unwrap();
        assert!(!observed.has_change(RESOURCE_TAG_SPECIFICATION));
        assert!(!observed.has_change(SECURITY_GROUPS));
    }
}
