//! Ocean GKE launch spec resource for spotform
//!
//! # Modules
//!
//! - [`fields`]: base field set (`ocean_gke_launch_spec`)
//! - [`strategy`]: `strategy` extension field set
//! - [`resource`]: create / read / update / delete over a [`LaunchSpecApi`]

pub mod error;
pub mod fields;
pub mod launch_spec;
pub mod resource;
pub mod strategy;

pub use error::{ERR_CODE_LAUNCH_SPEC_NOT_FOUND, GcpError, Result};
pub use launch_spec::{KeyValue, LaunchSpec, Strategy, Taint};
pub use resource::{LaunchSpecApi, LaunchSpecResource, registry};
