// Command handlers
// Boundary between user input (dialogs, CLI) and the link store: trims and
// validates strings, normalizes URLs, and flattens errors to String

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::export::{ExportOptions, ExportSummary, JsonExporter};
use crate::links::url::normalize_url;
use crate::links::{
    tree, Folder, FolderColor, ForestStats, Link, LinkTreeStore, LinkUpdate, LinkWithFolder,
    NewLink, FOLDER_COLORS,
};
use crate::storage::{AppSettings, DatabaseManager, StorageError, StorageResult};

/// Application state shared by every command
pub struct AppState {
    pub db: Mutex<DatabaseManager>,
    pub store: Mutex<LinkTreeStore>,
}

impl AppState {
    /// Open the database at `db_path` and load the folder forest from it
    pub fn open(db_path: PathBuf) -> StorageResult<Self> {
        let db = DatabaseManager::new(db_path.clone())?;
        // Second handle on the same file; the store owns its backend
        let store = LinkTreeStore::load(Box::new(DatabaseManager::new(db_path)?))?;
        Ok(Self {
            db: Mutex::new(db),
            store: Mutex::new(store),
        })
    }
}

/// Convert StorageError to a string for callers
impl From<StorageError> for String {
    fn from(err: StorageError) -> Self {
        err.to_string()
    }
}

/// Input for creating a link, as submitted by the add-link dialog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkInput {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub comment: Option<String>,
}

/// One row of a flattened folder picker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub color: String,
    pub depth: usize,
    pub link_count: usize,
    pub parent_id: Option<String>,
}

fn required(value: &str, field: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accept `#rrggbb` only, stored lowercase
fn validate_color(color: &str) -> Result<String, String> {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(format!("Invalid color '{}', expected #rrggbb", color));
    }
    Ok(color.to_ascii_lowercase())
}

fn lock_store(state: &AppState) -> Result<std::sync::MutexGuard<'_, LinkTreeStore>, String> {
    state.store.lock().map_err(|e| e.to_string())
}

// ============================================================================
// Folder Commands
// ============================================================================

/// Get the whole forest
pub fn get_folders(state: &AppState) -> Result<Vec<Folder>, String> {
    let store = lock_store(state)?;
    Ok(store.folders().to_vec())
}

/// Create a folder at the top level or under `parent_id`
pub fn add_folder(
    state: &AppState,
    name: String,
    parent_id: Option<String>,
    color: Option<String>,
) -> Result<Option<Folder>, String> {
    let name = required(&name, "Folder name")?;
    let color = color.as_deref().map(validate_color).transpose()?;
    let mut store = lock_store(state)?;
    store
        .add_folder(&name, parent_id.as_deref(), color.as_deref())
        .map_err(|e| e.to_string())
}

/// Delete a folder and everything below it. A saved folder selection that
/// pointed into the deleted subtree is cleared.
pub fn delete_folder(state: &AppState, id: String) -> Result<bool, String> {
    let mut store = lock_store(state)?;
    let deleted = store.delete_folder(&id).map_err(|e| e.to_string())?;
    if deleted {
        let db = state.db.lock().map_err(|e| e.to_string())?;
        if let Some(selected) = db.get_selected_folder_id()? {
            if store.find_folder_by_id(&selected).is_none() {
                db.set_selected_folder_id(None)?;
            }
        }
    }
    Ok(deleted)
}

pub fn rename_folder(state: &AppState, id: String, name: String) -> Result<bool, String> {
    let name = required(&name, "Folder name")?;
    let mut store = lock_store(state)?;
    store.rename_folder(&id, &name).map_err(|e| e.to_string())
}

pub fn update_folder_color(state: &AppState, id: String, color: String) -> Result<bool, String> {
    let color = validate_color(&color)?;
    let mut store = lock_store(state)?;
    store.update_folder_color(&id, &color).map_err(|e| e.to_string())
}

pub fn toggle_folder(state: &AppState, id: String) -> Result<bool, String> {
    let mut store = lock_store(state)?;
    store.toggle_folder(&id).map_err(|e| e.to_string())
}

pub fn find_folder(state: &AppState, id: String) -> Result<Option<Folder>, String> {
    let store = lock_store(state)?;
    Ok(store.find_folder_by_id(&id).cloned())
}

/// Ancestor chain from a root to the folder, as id/name rows
pub fn get_folder_path(state: &AppState, id: String) -> Result<Option<Vec<FolderEntry>>, String> {
    let store = lock_store(state)?;
    Ok(store.get_folder_path(&id).map(|path| {
        path.into_iter()
            .enumerate()
            .map(|(depth, folder)| folder_entry(depth, folder))
            .collect()
    }))
}

/// Every folder in pre-order, for move-target pickers
pub fn flatten_folders(state: &AppState) -> Result<Vec<FolderEntry>, String> {
    let store = lock_store(state)?;
    Ok(tree::flatten_with_depth(store.folders())
        .into_iter()
        .map(|(depth, folder)| folder_entry(depth, folder))
        .collect())
}

fn folder_entry(depth: usize, folder: &Folder) -> FolderEntry {
    FolderEntry {
        id: folder.id.clone(),
        name: folder.name.clone(),
        color: folder.display_color().to_string(),
        depth,
        link_count: folder.links.len(),
        parent_id: folder.parent_id.clone(),
    }
}

pub fn get_folder_colors() -> Vec<FolderColor> {
    FOLDER_COLORS.to_vec()
}

// ============================================================================
// Link Commands
// ============================================================================

/// Add a link; the URL gets an https:// prefix when it has no scheme
pub fn add_link(
    state: &AppState,
    folder_id: String,
    input: CreateLinkInput,
) -> Result<Option<Link>, String> {
    let new_link = NewLink {
        title: required(&input.title, "Title")?,
        url: normalize_url(&required(&input.url, "URL")?),
        description: optional_text(input.description),
        comment: optional_text(input.comment),
        favicon: None,
    };

    let mut store = lock_store(state)?;
    store.add_link(&folder_id, new_link).map_err(|e| e.to_string())
}

pub fn delete_link(state: &AppState, folder_id: String, link_id: String) -> Result<bool, String> {
    let mut store = lock_store(state)?;
    store.delete_link(&folder_id, &link_id).map_err(|e| e.to_string())
}

/// Update a link; blank optional fields are treated as "leave unchanged"
pub fn update_link(
    state: &AppState,
    folder_id: String,
    link_id: String,
    updates: LinkUpdate,
) -> Result<Option<Link>, String> {
    let updates = LinkUpdate {
        title: updates.title.as_deref().map(|t| required(t, "Title")).transpose()?,
        url: updates
            .url
            .as_deref()
            .map(|u| required(u, "URL").map(|u| normalize_url(&u)))
            .transpose()?,
        description: optional_text(updates.description),
        comment: optional_text(updates.comment),
        favicon: optional_text(updates.favicon),
    };

    let mut store = lock_store(state)?;
    store
        .update_link(&folder_id, &link_id, updates)
        .map_err(|e| e.to_string())
}

pub fn move_links(
    state: &AppState,
    link_ids: Vec<String>,
    source_folder_id: String,
    target_folder_id: String,
) -> Result<usize, String> {
    let mut store = lock_store(state)?;
    store
        .move_links(&link_ids, &source_folder_id, &target_folder_id)
        .map_err(|e| e.to_string())
}

pub fn get_all_links(state: &AppState) -> Result<Vec<LinkWithFolder>, String> {
    let store = lock_store(state)?;
    Ok(store.get_all_links())
}

pub fn search_links(
    state: &AppState,
    query: String,
    folder_id: Option<String>,
) -> Result<Vec<LinkWithFolder>, String> {
    let store = lock_store(state)?;
    Ok(store.search_links(&query, folder_id.as_deref()))
}

pub fn get_stats(state: &AppState) -> Result<ForestStats, String> {
    let store = lock_store(state)?;
    Ok(store.stats())
}

// ============================================================================
// Backup Commands
// ============================================================================

/// Write the forest to a JSON file
pub fn export_folders(
    state: &AppState,
    destination: String,
    pretty_print: bool,
) -> Result<ExportSummary, String> {
    let store = lock_store(state)?;
    JsonExporter::new(ExportOptions { pretty_print })
        .export_to_file(Path::new(&destination), store.folders())
        .map_err(|e| e.to_string())
}

/// Replace the forest with the contents of a JSON backup
pub fn import_folders(state: &AppState, source: String) -> Result<ExportSummary, String> {
    let source_path = Path::new(&source);
    if !source_path.exists() {
        return Err("Backup file not found.".to_string());
    }

    let folders = JsonExporter::import_from_file(source_path).map_err(|e| e.to_string())?;
    let stats = tree::stats(&folders);
    let bytes = std::fs::metadata(source_path)
        .map(|m| m.len() as usize)
        .unwrap_or(0);

    let mut store = lock_store(state)?;
    store.replace_all(folders)?;
    Ok(ExportSummary {
        folder_count: stats.folder_count,
        link_count: stats.link_count,
        bytes,
    })
}

// ============================================================================
// App Settings Commands
// ============================================================================

pub fn get_app_settings(state: &AppState) -> Result<AppSettings, String> {
    let db = state.db.lock().map_err(|e| e.to_string())?;
    db.get_app_settings().map_err(|e| e.to_string())
}

pub fn update_app_settings(state: &AppState, settings: AppSettings) -> Result<(), String> {
    let db = state.db.lock().map_err(|e| e.to_string())?;
    db.update_app_settings(&settings).map_err(|e| e.to_string())
}

/// The saved folder selection, or `None` when nothing is selected or the
/// selected folder no longer exists
pub fn get_selected_folder(state: &AppState) -> Result<Option<Folder>, String> {
    let selected = {
        let db = state.db.lock().map_err(|e| e.to_string())?;
        db.get_selected_folder_id()?
    };
    let Some(selected) = selected else {
        return Ok(None);
    };
    let store = lock_store(state)?;
    Ok(store.find_folder_by_id(&selected).cloned())
}
