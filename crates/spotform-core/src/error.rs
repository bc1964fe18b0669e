//! Reconciliation error types

use crate::field::FieldName;
use thiserror::Error;

/// Shape violations detected while decoding or writing configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: required attribute is missing")]
    MissingRequired { path: String },

    #[error("{path}: at most {max} item(s) allowed, found {found}")]
    TooManyItems {
        path: String,
        max: usize,
        found: usize,
    },

    #[error("{path}: unknown attribute")]
    UnknownField { path: String },
}

/// Errors raised by a reconciliation pass
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Flattening a remote value into the configuration handle failed
    #[error("failed to set field [{field}] during read: {source}")]
    FieldRead {
        field: FieldName,
        #[source]
        source: SchemaError,
    },

    /// Expanding a configuration value into the remote object failed
    #[error("failed to parse field [{field}]: {source}")]
    FieldParse {
        field: FieldName,
        #[source]
        source: SchemaError,
    },

    #[error("invalid configuration: {0}")]
    Schema(#[from] SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconcileError {
    pub fn read(field: FieldName, source: SchemaError) -> Self {
        Self::FieldRead { field, source }
    }

    pub fn parse(field: FieldName, source: SchemaError) -> Self {
        Self::FieldParse { field, source }
    }

    /// Name of the field that caused the failure, if any
    pub fn field(&self) -> Option<FieldName> {
        match self {
            Self::FieldRead { field, .. } | Self::FieldParse { field, .. } => Some(*field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
