//! `managed_instance_aws_integrations` Route53 field set

use crate::managed_instance::{Domain, ManagedInstance, RecordSet, Route53Integration};
use spotform_core::nested::{self, block_bool, block_str, single_block};
use spotform_core::{
    ConfigHandle, ConfigMap, ConfigValue, Elem, FieldDescriptor, FieldName, FieldRegistry,
    Nullable, ResourceType, Result, Schema,
};
use std::sync::LazyLock;

pub const RESOURCE: ResourceType = ResourceType::new("managed_instance_aws_integrations");

pub const INTEGRATION_ROUTE53: FieldName = FieldName::new("integration_route53");

pub const DOMAINS: &str = "domains";
pub const HOSTED_ZONE_ID: &str = "hosted_zone_id";
pub const SPOTINST_ACCT_ID: &str = "spotinst_acct_id";
pub const RECORD_SET_TYPE: &str = "record_set_type";
pub const RECORD_SETS: &str = "record_sets";
pub const USE_PUBLIC_IP: &str = "use_public_ip";
pub const USE_PUBLIC_DNS: &str = "use_public_dns";
pub const ROUTE53_NAME: &str = "name";

static REGISTRY: LazyLock<FieldRegistry<ManagedInstance>> = LazyLock::new(|| {
    let mut registry = FieldRegistry::new(RESOURCE.as_str());
    setup(&mut registry);
    registry
});

pub fn registry() -> &'static FieldRegistry<ManagedInstance> {
    &REGISTRY
}

fn record_set_schema() -> Schema {
    Schema::set(Elem::block([
        (USE_PUBLIC_IP, Schema::bool()),
        (USE_PUBLIC_DNS, Schema::bool()),
        (ROUTE53_NAME, Schema::string().required()),
    ]))
    .required()
}

fn domain_schema() -> Schema {
    Schema::set(Elem::block([
        (HOSTED_ZONE_ID, Schema::string().required()),
        (SPOTINST_ACCT_ID, Schema::string()),
        (RECORD_SET_TYPE, Schema::string()),
        (RECORD_SETS, record_set_schema()),
    ]))
    .required()
}

pub fn setup(registry: &mut FieldRegistry<ManagedInstance>) {
    registry.register(
        FieldDescriptor::new(
            RESOURCE,
            INTEGRATION_ROUTE53,
            Schema::list(Elem::block([(DOMAINS, domain_schema())])).max_items(1),
        )
        .with_read(read_route53)
        .with_create(create_route53)
        .with_update(update_route53),
    );
}

fn read_route53(instance: &ManagedInstance, handle: &mut ConfigHandle) -> Result<()> {
    let value = match instance.route53() {
        Some(integration) => single_block(flatten_integration(integration)),
        None => ConfigValue::List(Vec::new()),
    };
    handle.set_field(INTEGRATION_ROUTE53, value)
}

fn create_route53(handle: &ConfigHandle, instance: &mut ManagedInstance) -> Result<()> {
    if let Some(integration) = expand_integration(handle)? {
        instance.integration_mut().route53 = Nullable::Value(integration);
    }
    Ok(())
}

fn update_route53(handle: &ConfigHandle, instance: &mut ManagedInstance) -> Result<()> {
    let value = expand_integration(handle)?;
    instance.integration_mut().route53.set(value);
    Ok(())
}

fn expand_integration(handle: &ConfigHandle) -> Result<Option<Route53Integration>> {
    let Some(block) = nested::first_block(INTEGRATION_ROUTE53, handle.get(INTEGRATION_ROUTE53))?
    else {
        return Ok(None);
    };

    let mut integration = Route53Integration::default();
    if let Some(domains) = block.get(DOMAINS) {
        integration.domains = Nullable::Value(expand_domains(domains)?);
    }
    Ok(Some(integration))
}

fn expand_domains(value: &ConfigValue) -> Result<Vec<Domain>> {
    let mut domains = Vec::new();
    for attr in nested::blocks(INTEGRATION_ROUTE53, Some(value))? {
        let mut domain = Domain::default();
        if let Some(v) = block_str(attr, HOSTED_ZONE_ID) {
            domain.hosted_zone_id = Nullable::Value(v.to_string());
        }
        if let Some(v) = block_str(attr, SPOTINST_ACCT_ID) {
            domain.spotinst_account_id = Nullable::Value(v.to_string());
        }
        if let Some(v) = block_str(attr, RECORD_SET_TYPE) {
            domain.record_set_type = Nullable::Value(v.to_string());
        }
        if let Some(record_sets) = attr.get(RECORD_SETS) {
            domain.record_sets = Nullable::Value(expand_record_sets(record_sets)?);
        }
        domains.push(domain);
    }
    Ok(domains)
}

fn expand_record_sets(value: &ConfigValue) -> Result<Vec<RecordSet>> {
    Ok(nested::blocks(INTEGRATION_ROUTE53, Some(value))?
        .into_iter()
        .map(|attr| {
            let mut record_set = RecordSet::default();
            if let Some(v) = attr.get(ROUTE53_NAME).and_then(ConfigValue::as_str) {
                record_set.name = Nullable::Value(v.to_string());
            }
            // false is the API default, only true is sent
            if block_bool(attr, USE_PUBLIC_IP) == Some(true) {
                record_set.use_public_ip = Nullable::Value(true);
            }
            if block_bool(attr, USE_PUBLIC_DNS) == Some(true) {
                record_set.use_public_dns = Nullable::Value(true);
            }
            record_set
        })
        .collect())
}

fn flatten_integration(integration: &Route53Integration) -> ConfigMap {
    let domains = integration
        .domains
        .value()
        .map(|domains| domains.iter().map(flatten_domain).collect())
        .unwrap_or_default();
    ConfigMap::from([(DOMAINS.to_string(), ConfigValue::Set(domains))])
}

fn flatten_domain(domain: &Domain) -> ConfigValue {
    let text = |slot: &Nullable<String>| ConfigValue::from(slot.value().cloned().unwrap_or_default());
    let record_sets = domain
        .record_sets
        .value()
        .map(|sets| sets.iter().map(flatten_record_set).collect())
        .unwrap_or_default();

    ConfigValue::block([
        (HOSTED_ZONE_ID, text(&domain.hosted_zone_id)),
        (SPOTINST_ACCT_ID, text(&domain.spotinst_account_id)),
        (RECORD_SET_TYPE, text(&domain.record_set_type)),
        (RECORD_SETS, ConfigValue::Set(record_sets)),
    ])
}

fn flatten_record_set(record_set: &RecordSet) -> ConfigValue {
    let flag = |slot: &Nullable<bool>| ConfigValue::Bool(slot.value().copied().unwrap_or_default());
    ConfigValue::block([
        (
            ROUTE53_NAME,
            ConfigValue::from(record_set.name.value().cloned().unwrap_or_default()),
        ),
        (USE_PUBLIC_IP, flag(&record_set.use_public_ip)),
        (USE_PUBLIC_DNS, flag(&record_set.use_public_dns)),
    ])
}
