//! AWS resources for spotform
//!
//! - **Elastigroup launch configuration**: [`launch_configuration`] maps the
//!   `launch_configuration` block onto `compute.launchSpecification`
//! - **Managed instance Route53 integration**: [`route53`]
//!
//! # Example
//!
//! ```ignore
//! use spotform_aws::launch_configuration;
//! use spotform_core::Reconciler;
//!
//! let registry = launch_configuration::registry();
//! let handle = registry.decode_config(&document)?;
//! let payload = Reconciler::new(registry).on_create(None, &handle)?;
//! ```

pub mod elastigroup;
pub mod launch_configuration;
pub mod managed_instance;
pub mod route53;

pub use elastigroup::{Elastigroup, LaunchSpecification};
pub use managed_instance::ManagedInstance;
