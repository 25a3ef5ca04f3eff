// Folder/link tree manager
// Owns the forest in memory and writes the whole snapshot through to storage after each change

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{
    default_folders, now_millis, Folder, ForestStats, Link, LinkUpdate, LinkWithFolder, NewLink,
    DEFAULT_FOLDER_COLOR,
};
use super::{search, tree};
use crate::storage::{SnapshotBackend, StorageResult};

/// Storage key holding the serialized forest
pub const STORAGE_KEY: &str = "link-hub-folders";

/// Key a malformed snapshot is copied to before defaults replace it
pub const CORRUPT_STORAGE_KEY: &str = "link-hub-folders.corrupt";

pub struct LinkTreeStore {
    folders: Vec<Folder>,
    backend: Box<dyn SnapshotBackend>,
}

impl LinkTreeStore {
    /// Load the forest from `backend`.
    ///
    /// A missing snapshot seeds the default folders. A snapshot that fails to
    /// parse is kept under [`CORRUPT_STORAGE_KEY`] and also replaced by the
    /// defaults, so startup never fails on bad data; only backend I/O errors
    /// are returned.
    pub fn load(backend: Box<dyn SnapshotBackend>) -> StorageResult<Self> {
        let raw = backend.read(STORAGE_KEY)?;

        let (folders, needs_save) = match raw {
            Some(raw) => match tree::decode_forest(&raw) {
                Ok(folders) => (folders, false),
                Err(e) => {
                    warn!("[Store] Snapshot is not valid JSON ({}), falling back to defaults", e);
                    backend.write(CORRUPT_STORAGE_KEY, &raw)?;
                    (default_folders(), true)
                }
            },
            None => {
                info!("[Store] No snapshot found, seeding default folders");
                (default_folders(), true)
            }
        };

        let store = Self { folders, backend };
        if needs_save {
            store.save()?;
        }

        let stats = store.stats();
        debug!(
            "[Store] Loaded {} folders, {} links",
            stats.folder_count, stats.link_count
        );
        Ok(store)
    }

    /// Serialize the whole forest and overwrite the stored snapshot
    pub fn save(&self) -> StorageResult<()> {
        let json = serde_json::to_string(&self.folders)?;
        self.backend.write(STORAGE_KEY, &json)
    }

    /// Save only when the operation changed something
    fn commit(&self, changed: bool) -> StorageResult<bool> {
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Replace the whole forest (used by import) and persist it
    pub fn replace_all(&mut self, folders: Vec<Folder>) -> StorageResult<()> {
        self.folders = folders;
        info!("[Store] Replaced forest with {} top-level folders", self.folders.len());
        self.save()
    }

    // ========================================================================
    // Folder operations
    // ========================================================================

    /// Create a folder at the top level, or inside `parent_id`.
    ///
    /// The parent is expanded so the new child is visible. Returns `None`
    /// without touching state when the parent does not exist.
    pub fn add_folder(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
        color: Option<&str>,
    ) -> StorageResult<Option<Folder>> {
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: Some(color.unwrap_or(DEFAULT_FOLDER_COLOR).to_string()),
            links: Vec::new(),
            subfolders: Vec::new(),
            is_expanded: true,
            created_at: now_millis(),
            parent_id: parent_id.map(str::to_string),
        };

        match parent_id {
            Some(parent_id) => {
                let child = folder.clone();
                let added = tree::update_folder(&mut self.folders, parent_id, |parent| {
                    parent.subfolders.push(child);
                    parent.is_expanded = true;
                });
                if !added {
                    debug!("[Store] add_folder: parent {} not found", parent_id);
                    return Ok(None);
                }
            }
            None => self.folders.push(folder.clone()),
        }

        self.save()?;
        info!("[Store] Created folder: {}", folder.id);
        Ok(Some(folder))
    }

    /// Delete a folder together with its subfolders and links. Every folder
    /// carrying the id goes, should a hand-edited snapshot repeat it.
    pub fn delete_folder(&mut self, folder_id: &str) -> StorageResult<bool> {
        let removed = tree::remove_folder(&mut self.folders, folder_id);
        if !removed.is_empty() {
            let dropped = tree::stats(&removed);
            info!(
                "[Store] Deleted folder {} ({} folders, {} links removed)",
                folder_id, dropped.folder_count, dropped.link_count
            );
        }
        self.commit(!removed.is_empty())
    }

    pub fn rename_folder(&mut self, folder_id: &str, new_name: &str) -> StorageResult<bool> {
        let changed = tree::update_folder(&mut self.folders, folder_id, |folder| {
            folder.name = new_name.to_string();
        });
        self.commit(changed)
    }

    pub fn update_folder_color(&mut self, folder_id: &str, color: &str) -> StorageResult<bool> {
        let changed = tree::update_folder(&mut self.folders, folder_id, |folder| {
            folder.color = Some(color.to_string());
        });
        self.commit(changed)
    }

    /// Flip a folder between expanded and collapsed
    pub fn toggle_folder(&mut self, folder_id: &str) -> StorageResult<bool> {
        let changed = tree::update_folder(&mut self.folders, folder_id, |folder| {
            folder.is_expanded = !folder.is_expanded;
        });
        self.commit(changed)
    }

    // ========================================================================
    // Link operations
    // ========================================================================

    /// Append a new link to a folder; `None` when the folder does not exist
    pub fn add_link(&mut self, folder_id: &str, input: NewLink) -> StorageResult<Option<Link>> {
        let link = Link {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            url: input.url,
            description: input.description,
            comment: input.comment,
            favicon: input.favicon,
            created_at: now_millis(),
        };

        let pushed = link.clone();
        let added = tree::update_folder(&mut self.folders, folder_id, |folder| {
            folder.links.push(pushed);
        });
        if !added {
            return Ok(None);
        }

        self.save()?;
        debug!("[Store] Added link {} to folder {}", link.id, folder_id);
        Ok(Some(link))
    }

    pub fn delete_link(&mut self, folder_id: &str, link_id: &str) -> StorageResult<bool> {
        let mut removed = false;
        tree::update_folder(&mut self.folders, folder_id, |folder| {
            let before = folder.links.len();
            folder.links.retain(|l| l.id != link_id);
            removed = folder.links.len() != before;
        });
        self.commit(removed)
    }

    /// Merge `updates` into a link; identity and creation time never change
    pub fn update_link(
        &mut self,
        folder_id: &str,
        link_id: &str,
        updates: LinkUpdate,
    ) -> StorageResult<Option<Link>> {
        let has_changes = !updates.is_empty();
        let updated = tree::find_folder_mut(&mut self.folders, folder_id)
            .and_then(|folder| folder.links.iter_mut().find(|l| l.id == link_id))
            .map(|link| {
                updates.apply(link);
                link.clone()
            });

        self.commit(has_changes && updated.is_some())?;
        Ok(updated)
    }

    /// Move links from one folder to another, keeping their order and
    /// identity. Returns how many links moved.
    ///
    /// Nothing happens when the source is missing, none of the ids are in it,
    /// or the target is missing (the links stay where they are). Links are
    /// not deduplicated against ones already in the target.
    pub fn move_links(
        &mut self,
        link_ids: &[String],
        source_folder_id: &str,
        target_folder_id: &str,
    ) -> StorageResult<usize> {
        if source_folder_id == target_folder_id {
            return Ok(0);
        }

        let Some(source) = tree::find_folder(&self.folders, source_folder_id) else {
            return Ok(0);
        };
        let moving = source
            .links
            .iter()
            .filter(|l| link_ids.contains(&l.id))
            .count();
        if moving == 0 || tree::find_folder(&self.folders, target_folder_id).is_none() {
            return Ok(0);
        }

        let mut taken = Vec::with_capacity(moving);
        tree::update_folder(&mut self.folders, source_folder_id, |folder| {
            let (moved, kept): (Vec<Link>, Vec<Link>) = std::mem::take(&mut folder.links)
                .into_iter()
                .partition(|l| link_ids.contains(&l.id));
            folder.links = kept;
            taken = moved;
        });
        tree::update_folder(&mut self.folders, target_folder_id, |folder| {
            folder.links.extend(taken);
        });

        self.save()?;
        info!(
            "[Store] Moved {} links from {} to {}",
            moving, source_folder_id, target_folder_id
        );
        Ok(moving)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn find_folder_by_id(&self, folder_id: &str) -> Option<&Folder> {
        tree::find_folder(&self.folders, folder_id)
    }

    pub fn get_all_links(&self) -> Vec<LinkWithFolder> {
        tree::all_links(&self.folders)
    }

    /// Ancestors of a folder from its root down to the folder itself
    pub fn get_folder_path(&self, folder_id: &str) -> Option<Vec<&Folder>> {
        tree::folder_path(&self.folders, folder_id)
    }

    pub fn flatten_folders(&self) -> Vec<&Folder> {
        tree::flatten(&self.folders)
    }

    pub fn search_links(&self, query: &str, folder_id: Option<&str>) -> Vec<LinkWithFolder> {
        search::search_links(&self.folders, query, folder_id)
    }

    pub fn stats(&self) -> ForestStats {
        tree::stats(&self.folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::tree::tests::{folder, link};
    use crate::storage::{DatabaseManager, MemoryBackend};

    fn store_with(folders: Vec<Folder>) -> (LinkTreeStore, MemoryBackend) {
        let raw = serde_json::to_string(&folders).unwrap();
        let backend = MemoryBackend::with_entry(STORAGE_KEY, &raw);
        let store = LinkTreeStore::load(Box::new(backend.clone())).unwrap();
        (store, backend)
    }

    fn persisted(backend: &MemoryBackend) -> Vec<Folder> {
        let raw = backend.read(STORAGE_KEY).unwrap().unwrap();
        tree::decode_forest(&raw).unwrap()
    }

    fn favoris() -> Vec<Folder> {
        vec![folder("1", "Favoris", vec![])]
    }

    #[test]
    fn test_load_seeds_defaults_and_persists_them() {
        let backend = MemoryBackend::new();
        let store = LinkTreeStore::load(Box::new(backend.clone())).unwrap();

        assert_eq!(store.folders().len(), 2);
        assert_eq!(store.folders()[0].name, "Favoris");
        assert_eq!(persisted(&backend), store.folders());
    }

    #[test]
    fn test_load_malformed_snapshot_falls_back_and_keeps_copy() {
        let backend = MemoryBackend::with_entry(STORAGE_KEY, "{oops");
        let store = LinkTreeStore::load(Box::new(backend.clone())).unwrap();

        assert_eq!(store.stats(), ForestStats { folder_count: 2, link_count: 3 });
        assert_eq!(
            backend.read(CORRUPT_STORAGE_KEY).unwrap(),
            Some("{oops".to_string())
        );
        assert_eq!(persisted(&backend).len(), 2);
    }

    #[test]
    fn test_load_migrates_legacy_snapshot() {
        let raw = r#"[{"id":"1","name":"Favoris","links":[],"isExpanded":true,"createdAt":1}]"#;
        let backend = MemoryBackend::with_entry(STORAGE_KEY, raw);
        let store = LinkTreeStore::load(Box::new(backend)).unwrap();

        let folder = store.find_folder_by_id("1").unwrap();
        assert!(folder.subfolders.is_empty());
        assert_eq!(folder.color.as_deref(), Some(DEFAULT_FOLDER_COLOR));
    }

    #[test]
    fn test_load_keeps_snapshot_with_null_lists() {
        let raw = r##"[{"id":"u1","name":"Mine","color":"#ef4444","isExpanded":true,"createdAt":1,
            "links":[{"id":"k1","title":"Kept","url":"https://kept.example","createdAt":2}],
            "subfolders":null}]"##;
        let backend = MemoryBackend::with_entry(STORAGE_KEY, raw);
        let store = LinkTreeStore::load(Box::new(backend.clone())).unwrap();

        let names: Vec<&str> = store.folders().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Mine"]);
        assert_eq!(store.get_all_links()[0].link.id, "k1");
        assert!(backend.read(CORRUPT_STORAGE_KEY).unwrap().is_none());
        assert_eq!(backend.read(STORAGE_KEY).unwrap().as_deref(), Some(raw));
    }

    #[test]
    fn test_add_top_level_folder() {
        let (mut store, backend) = store_with(favoris());

        let created = store.add_folder("Travail", None, None).unwrap().unwrap();

        assert_eq!(store.folders().len(), 2);
        assert_eq!(store.folders()[1].name, "Travail");
        assert!(!created.id.is_empty());
        assert_ne!(created.id, "1");
        assert!(created.is_expanded);
        assert_eq!(created.color.as_deref(), Some(DEFAULT_FOLDER_COLOR));
        assert!(created.parent_id.is_none());
        assert_eq!(persisted(&backend), store.folders());
    }

    #[test]
    fn test_add_subfolder_expands_parent() {
        let (mut store, _backend) = store_with(favoris());
        assert!(!store.find_folder_by_id("1").unwrap().is_expanded);

        let child = store
            .add_folder("Rust", Some("1"), Some("#ef4444"))
            .unwrap()
            .unwrap();

        let parent = store.find_folder_by_id("1").unwrap();
        assert!(parent.is_expanded);
        assert_eq!(parent.subfolders.len(), 1);
        assert_eq!(parent.subfolders[0].id, child.id);
        assert_eq!(child.parent_id.as_deref(), Some("1"));
        assert_eq!(child.color.as_deref(), Some("#ef4444"));
    }

    #[test]
    fn test_add_folder_with_unknown_parent_is_noop() {
        let (mut store, backend) = store_with(favoris());
        let before = store.folders().to_vec();

        assert!(store.add_folder("Lost", Some("missing"), None).unwrap().is_none());
        assert_eq!(store.folders(), before.as_slice());
        assert_eq!(persisted(&backend), before);
    }

    #[test]
    fn test_delete_folder_removes_descendants() {
        let (mut store, backend) = store_with(favoris());
        let child = store.add_folder("Child", Some("1"), None).unwrap().unwrap();
        let grandchild = store
            .add_folder("Grandchild", Some(child.id.as_str()), None)
            .unwrap()
            .unwrap();
        store
            .add_link(&grandchild.id, NewLink {
                title: "Deep".to_string(),
                url: "https://deep.example".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert!(store.delete_folder(&child.id).unwrap());

        assert!(store.find_folder_by_id(&child.id).is_none());
        assert!(store.find_folder_by_id(&grandchild.id).is_none());
        assert!(store.get_all_links().is_empty());
        assert_eq!(persisted(&backend), store.folders());

        assert!(!store.delete_folder(&child.id).unwrap());
    }

    #[test]
    fn test_rename_missing_folder_leaves_forest_unchanged() {
        let (mut store, _backend) = store_with(favoris());
        let before = store.folders().to_vec();

        assert!(!store.rename_folder("missing", "Nope").unwrap());
        assert_eq!(store.folders(), before.as_slice());

        assert!(store.rename_folder("1", "Favorites").unwrap());
        assert_eq!(store.find_folder_by_id("1").unwrap().name, "Favorites");
    }

    #[test]
    fn test_color_and_toggle() {
        let (mut store, _backend) = store_with(favoris());

        assert!(store.update_folder_color("1", "#22c55e").unwrap());
        assert!(store.toggle_folder("1").unwrap());
        let folder = store.find_folder_by_id("1").unwrap();
        assert_eq!(folder.color.as_deref(), Some("#22c55e"));
        assert!(folder.is_expanded);

        assert!(store.toggle_folder("1").unwrap());
        assert!(!store.find_folder_by_id("1").unwrap().is_expanded);
        assert!(!store.toggle_folder("missing").unwrap());
    }

    #[test]
    fn test_add_link_to_folder() {
        let (mut store, backend) = store_with(favoris());

        let link = store
            .add_link("1", NewLink {
                title: "Example".to_string(),
                url: "https://example.com".to_string(),
                ..Default::default()
            })
            .unwrap()
            .unwrap();

        let folder = store.find_folder_by_id("1").unwrap();
        assert_eq!(folder.links.len(), 1);
        assert_eq!(folder.links[0].url, "https://example.com");
        assert_eq!(folder.links[0].id, link.id);
        assert_eq!(persisted(&backend)[0].links.len(), 1);

        let missing = store
            .add_link("missing", NewLink::default())
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_delete_and_update_link() {
        let mut root = folder("1", "Favoris", vec![]);
        root.links.push(link("a", "Alpha"));
        root.links.push(link("b", "Beta"));
        let (mut store, _backend) = store_with(vec![root]);

        let updated = store
            .update_link("1", "a", LinkUpdate {
                title: Some("Alpha 2".to_string()),
                description: Some("first".to_string()),
                ..Default::default()
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Alpha 2");
        assert_eq!(updated.url, "https://a.example");
        assert_eq!(updated.created_at, 100);

        assert!(store.update_link("1", "zzz", LinkUpdate::default()).unwrap().is_none());

        assert!(store.delete_link("1", "b").unwrap());
        assert!(!store.delete_link("1", "b").unwrap());
        let ids: Vec<&str> = store.folders()[0].links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_empty_link_update_skips_write() {
        // Spacing differs from serde output, so any rewrite would show
        let raw = r##"[ {"id":"1","name":"Favoris","color":"#6b7280","isExpanded":true,"createdAt":1,
            "links":[ {"id":"a","title":"Alpha","url":"https://a.example","createdAt":100} ]} ]"##;
        let backend = MemoryBackend::with_entry(STORAGE_KEY, raw);
        let mut store = LinkTreeStore::load(Box::new(backend.clone())).unwrap();

        let unchanged = store
            .update_link("1", "a", LinkUpdate::default())
            .unwrap()
            .unwrap();

        assert_eq!(unchanged.title, "Alpha");
        assert_eq!(backend.read(STORAGE_KEY).unwrap().as_deref(), Some(raw));
    }

    #[test]
    fn test_move_links_between_nested_folders() {
        let mut source = folder("src", "Source", vec![]);
        source.links.push(link("a", "Alpha"));
        source.links.push(link("b", "Beta"));
        source.links.push(link("c", "Gamma"));
        let mut target = folder("dst", "Target", vec![]);
        target.links.push(link("z", "Zeta"));
        let root = folder("root", "Root", vec![target]);
        let (mut store, backend) = store_with(vec![source, root]);

        let ids = vec!["c".to_string(), "a".to_string()];
        let before_a = store.find_folder_by_id("src").unwrap().links[0].clone();

        assert_eq!(store.move_links(&ids, "src", "dst").unwrap(), 2);

        let src: Vec<&str> = store.find_folder_by_id("src").unwrap().links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(src, vec!["b"]);
        let dst = &store.find_folder_by_id("dst").unwrap().links;
        let dst_ids: Vec<&str> = dst.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(dst_ids, vec!["z", "a", "c"]);
        assert_eq!(dst[1], before_a);
        assert_eq!(persisted(&backend), store.folders());
    }

    #[test]
    fn test_move_links_noop_cases() {
        let mut source = folder("src", "Source", vec![]);
        source.links.push(link("a", "Alpha"));
        let (mut store, _backend) = store_with(vec![source, folder("dst", "Target", vec![])]);
        let before = store.folders().to_vec();
        let ids = vec!["a".to_string()];

        assert_eq!(store.move_links(&ids, "missing", "dst").unwrap(), 0);
        assert_eq!(store.move_links(&["nope".to_string()], "src", "dst").unwrap(), 0);
        assert_eq!(store.move_links(&ids, "src", "missing").unwrap(), 0);
        assert_eq!(store.move_links(&ids, "src", "src").unwrap(), 0);
        assert_eq!(store.folders(), before.as_slice());
    }

    #[test]
    fn test_link_count_matches_folder_sum() {
        let backend = MemoryBackend::new();
        let mut store = LinkTreeStore::load(Box::new(backend)).unwrap();
        let child = store.add_folder("Nested", Some("2"), None).unwrap().unwrap();
        store
            .add_link(&child.id, NewLink {
                title: "Docs".to_string(),
                url: "https://docs.rs".to_string(),
                ..Default::default()
            })
            .unwrap();

        let total: usize = store.flatten_folders().iter().map(|f| f.links.len()).sum();
        assert_eq!(store.get_all_links().len(), total);
        assert_eq!(store.stats(), ForestStats { folder_count: 3, link_count: 4 });

        let path: Vec<&str> = store
            .get_folder_path(&child.id)
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(path, vec!["Travail", "Nested"]);
        assert_eq!(store.search_links("docs", None).len(), 1);
    }

    #[test]
    fn test_store_survives_reload_from_database() {
        let db_path = std::env::temp_dir().join(format!("link_hub_store_test_{}.db", Uuid::new_v4()));

        let created_id = {
            let db = DatabaseManager::new(db_path.clone()).unwrap();
            let mut store = LinkTreeStore::load(Box::new(db)).unwrap();
            store.add_folder("Reading", None, Some("#8b5cf6")).unwrap().unwrap().id
        };

        let db = DatabaseManager::new(db_path.clone()).unwrap();
        let store = LinkTreeStore::load(Box::new(db)).unwrap();
        let folder = store.find_folder_by_id(&created_id).unwrap();
        assert_eq!(folder.name, "Reading");
        assert_eq!(folder.color.as_deref(), Some("#8b5cf6"));
        assert_eq!(store.folders().len(), 3);

        let _ = std::fs::remove_file(&db_path);
    }
}
