// JSON backup engine
// Writes the forest in the same shape as the stored snapshot so backups can be re-imported

use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{ExportError, ExportOptions, ExportSummary};
use crate::links::tree;
use crate::links::Folder;

/// JSON exporter for folder forests
pub struct JsonExporter {
    options: ExportOptions,
}

impl JsonExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn with_default_options() -> Self {
        Self::new(ExportOptions::default())
    }

    /// Serialize a forest to a JSON string
    pub fn export_to_string(&self, folders: &[Folder]) -> Result<String, ExportError> {
        if self.options.pretty_print {
            serde_json::to_string_pretty(folders)
        } else {
            serde_json::to_string(folders)
        }
        .map_err(|e| ExportError::SerializationError(e.to_string()))
    }

    /// Write a forest to a file, creating parent directories as needed
    pub fn export_to_file(&self, path: &Path, folders: &[Folder]) -> Result<ExportSummary, ExportError> {
        let json = self.export_to_string(folders)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;

        let stats = tree::stats(folders);
        info!(
            "[Export] Wrote {} folders, {} links to {:?}",
            stats.folder_count, stats.link_count, path
        );
        Ok(ExportSummary {
            folder_count: stats.folder_count,
            link_count: stats.link_count,
            bytes: json.len(),
        })
    }

    /// Parse a backup, running the same migration as a stored snapshot.
    /// Forests whose folder ids repeat are rejected.
    pub fn import_from_str(raw: &str) -> Result<Vec<Folder>, ExportError> {
        let folders =
            tree::decode_forest(raw).map_err(|e| ExportError::InvalidData(e.to_string()))?;

        let duplicates = tree::duplicate_folder_ids(&folders);
        if !duplicates.is_empty() {
            return Err(ExportError::InvalidData(format!(
                "duplicate folder ids: {}",
                duplicates.join(", ")
            )));
        }

        Ok(folders)
    }

    pub fn import_from_file(path: &Path) -> Result<Vec<Folder>, ExportError> {
        let raw = std::fs::read_to_string(path)?;
        Self::import_from_str(&raw)
    }
}
