//! Elastigroup remote object graph
//!
//! Only the part of the group reached by the launch configuration is
//! modeled. Slots left `Unset` are omitted from payloads.

use serde::{Deserialize, Serialize};
use spotform_core::Nullable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elastigroup {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub compute: Nullable<Compute>,
}

impl Elastigroup {
    /// Launch specification, if the group has one
    pub fn launch_spec(&self) -> Option<&LaunchSpecification> {
        self.compute.value()?.launch_specification.value()
    }

    /// Launch specification, created along with its parents when missing
    pub fn launch_spec_mut(&mut self) -> &mut LaunchSpecification {
        self.compute
            .get_or_insert_with(Compute::default)
            .launch_specification
            .get_or_insert_with(LaunchSpecification::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compute {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub launch_specification: Nullable<LaunchSpecification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpecification {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub image_id: Nullable<String>,

    #[serde(default, rename = "iamRole", skip_serializing_if = "Nullable::is_unset")]
    pub iam_instance_profile: Nullable<IamInstanceProfile>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub key_pair: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub security_group_ids: Nullable<Vec<String>>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub user_data: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub shutdown_script: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub monitoring: Nullable<bool>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub ebs_optimized: Nullable<bool>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub tenancy: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub credit_specification: Nullable<CreditSpecification>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub metadata_options: Nullable<MetadataOptions>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub cpu_options: Nullable<CpuOptions>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub resource_tag_specification: Nullable<ResourceTagSpecification>,
}

/// Instance profile given by ARN or by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamInstanceProfile {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub arn: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub name: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSpecification {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub cpu_credits: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataOptions {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub http_tokens: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub http_put_response_hop_limit: Nullable<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuOptions {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub threads_per_core: Nullable<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTagSpecification {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub volumes: Nullable<ShouldTag>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub snapshots: Nullable<ShouldTag>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub enis: Nullable<ShouldTag>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub amis: Nullable<ShouldTag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShouldTag {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub should_tag: Nullable<bool>,
}

impl ShouldTag {
    pub fn new(should_tag: bool) -> Self {
        Self {
            should_tag: Nullable::Value(should_tag),
        }
    }

    pub fn get(&self) -> bool {
        self.should_tag.value().copied().unwrap_or_default()
    }
}
