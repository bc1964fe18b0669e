//! Managed instance remote object graph (integrations only)

use serde::{Deserialize, Serialize};
use spotform_core::Nullable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedInstance {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub integration: Nullable<Integration>,
}

impl ManagedInstance {
    pub fn route53(&self) -> Option<&Route53Integration> {
        self.integration.value()?.route53.value()
    }

    pub fn integration_mut(&mut self) -> &mut Integration {
        self.integration.get_or_insert_with(Integration::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub route53: Nullable<Route53Integration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route53Integration {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub domains: Nullable<Vec<Domain>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub hosted_zone_id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub spotinst_account_id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub record_set_type: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub record_sets: Nullable<Vec<RecordSet>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub name: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub use_public_ip: Nullable<bool>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub use_public_dns: Nullable<bool>,
}
