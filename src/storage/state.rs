// UI settings persisted next to the folder snapshot in the app_state table

use serde::{Deserialize, Serialize};

use super::database::{DatabaseManager, StorageResult};

/// How the link pane lays out its cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub view_mode: ViewMode,
    pub selected_folder_id: Option<String>,
}

impl DatabaseManager {
    /// Get view mode setting, falling back to grid for unknown values
    pub fn get_view_mode(&self) -> StorageResult<ViewMode> {
        let value = self.get_state("view_mode")?;
        Ok(value
            .as_deref()
            .and_then(ViewMode::from_str)
            .unwrap_or_default())
    }

    pub fn set_view_mode(&self, mode: ViewMode) -> StorageResult<()> {
        self.set_state("view_mode", mode.as_str())
    }

    /// Get the folder last selected in the sidebar
    pub fn get_selected_folder_id(&self) -> StorageResult<Option<String>> {
        self.get_state("selected_folder_id")
    }

    pub fn set_selected_folder_id(&self, folder_id: Option<&str>) -> StorageResult<()> {
        match folder_id {
            Some(id) => self.set_state("selected_folder_id", id),
            // None means "all links"
            None => self.delete_state("selected_folder_id").map(|_| ()),
        }
    }

    /// Get app settings as a struct
    pub fn get_app_settings(&self) -> StorageResult<AppSettings> {
        Ok(AppSettings {
            view_mode: self.get_view_mode()?,
            selected_folder_id: self.get_selected_folder_id()?,
        })
    }

    /// Update app settings
    pub fn update_app_settings(&self, settings: &AppSettings) -> StorageResult<()> {
        self.set_view_mode(settings.view_mode)?;
        self.set_selected_folder_id(settings.selected_folder_id.as_deref())?;
        Ok(())
    }
}
