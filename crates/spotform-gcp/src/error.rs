//! Ocean GKE error types

use spotform_core::ReconcileError;
use thiserror::Error;

/// Error code the API returns for a launch spec that no longer exists
pub const ERR_CODE_LAUNCH_SPEC_NOT_FOUND: &str = "CANT_GET_OCEAN_LAUNCH_SPEC";

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("API error [{code}]: {message}")]
    Api { code: String, message: String },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("launch spec has no id")]
    MissingId,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GcpError {
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether the error reports a launch spec that is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code == ERR_CODE_LAUNCH_SPEC_NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, GcpError>;
