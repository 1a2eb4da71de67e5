//! Cached infrastructure metadata.
//!
//! An optional JSON document describing provisioned resources, read once at
//! startup and owned by the application state - never a process global. The
//! only field the service depends on is `vulnerable_instance.public_ip`,
//! used as the fallback probe target when a request names none.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Errors loading the metadata document.
#[derive(Debug, Error)]
pub enum InfraError {
    /// Failed to read the metadata file.
    #[error("failed to read infrastructure file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the metadata JSON.
    #[error("failed to parse infrastructure JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only infrastructure metadata blob.
#[derive(Debug, Clone)]
pub struct InfrastructureInfo {
    raw: Value,
}

impl InfrastructureInfo {
    /// Load the document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InfraError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let raw: Value = serde_json::from_str(&content)?;
        Ok(Self { raw })
    }

    /// Wrap an already-parsed document.
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// The fallback probe target, when the document carries one.
    pub fn fallback_target(&self) -> Option<&str> {
        self.raw
            .get("vulnerable_instance")?
            .get("public_ip")?
            .as_str()
    }

    /// The full document.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}
