// Export Module
// Backup and restore of the folder forest as standalone JSON files

pub mod json;

pub use json::JsonExporter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export options for customizing output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Pretty print JSON output
    pub pretty_print: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

/// What an export or import touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub folder_count: usize,
    pub link_count: usize,
    pub bytes: usize,
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid backup: {0}")]
    InvalidData(String),
}
