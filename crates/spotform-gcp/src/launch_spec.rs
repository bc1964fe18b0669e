//! Ocean GKE launch spec remote object

use serde::{Deserialize, Serialize};
use spotform_core::Nullable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpec {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub ocean_id: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub source_image: Nullable<String>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub service_account: Nullable<String>,

    #[serde(default, rename = "rootVolumeSizeInGb", skip_serializing_if = "Nullable::is_unset")]
    pub root_volume_size: Nullable<i64>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub instance_types: Nullable<Vec<String>>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub restrict_scale_down: Nullable<bool>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub metadata: Nullable<Vec<KeyValue>>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub labels: Nullable<Vec<KeyValue>>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub taints: Nullable<Vec<Taint>>,

    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub strategy: Nullable<Strategy>,
}

impl LaunchSpec {
    pub fn id(&self) -> Option<&str> {
        self.id.value().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taint {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub effect: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    #[serde(default, skip_serializing_if = "Nullable::is_unset")]
    pub preemptible_percentage: Nullable<i64>,
}
