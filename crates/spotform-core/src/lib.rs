//! Spotform field registry and reconciliation engine
//!
//! Every configurable attribute of a resource is declared once as a
//! [`FieldDescriptor`]: its schema fragment and the functions that move the
//! value between a typed remote object and a [`ConfigHandle`]. A
//! [`Reconciler`] drives all descriptors of a [`FieldRegistry`] through one
//! create, read or update pass.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          spotform CLI / resource crate        │
//! └──────────────────┬───────────────────────────┘
//!                    │ setup(&mut registry)
//! ┌──────────────────▼───────────────────────────┐
//! │                spotform-core                  │
//! │  ┌────────────────┐   ┌──────────────────┐   │
//! │  │ FieldRegistry  │──▶│    Reconciler    │   │
//! │  │ (descriptors)  │   │ create/read/upd. │   │
//! │  └────────────────┘   └────────┬─────────┘   │
//! │                                │             │
//! │        ConfigHandle ◀──────────┴──▶ remote R │
//! └──────────────────────────────────────────────┘
//! ```

pub mod encoding;
pub mod error;
pub mod field;
pub mod handle;
pub mod nested;
pub mod nullable;
pub mod reconciler;
pub mod registry;
pub mod schema;
pub mod value;

// Re-exports
pub use encoding::{EMPTY_SHA1, Identifier};
pub use error::{ReconcileError, Result, SchemaError};
pub use field::{DeserializeFn, ExpandFn, FieldDescriptor, FieldName, ReadFn, ResourceType};
pub use handle::ConfigHandle;
pub use nullable::Nullable;
pub use reconciler::{Reconciler, UpdatePlan};
pub use registry::FieldRegistry;
pub use schema::{Elem, Schema, SchemaMap, ValueType};
pub use value::{ConfigMap, ConfigValue};
