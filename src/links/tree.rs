// Recursive helpers over the folder forest
// Every lookup is depth-first, pre-order, first match wins

use std::collections::HashSet;

use super::model::{Folder, ForestStats, LinkWithFolder, DEFAULT_FOLDER_COLOR};

/// Find a folder anywhere in the forest
pub fn find_folder<'a>(folders: &'a [Folder], id: &str) -> Option<&'a Folder> {
    for folder in folders {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_folder(&folder.subfolders, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_folder_mut<'a>(folders: &'a mut [Folder], id: &str) -> Option<&'a mut Folder> {
    for folder in folders.iter_mut() {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_folder_mut(&mut folder.subfolders, id) {
            return Some(found);
        }
    }
    None
}

/// Apply `update` to the folder with the given id; siblings and unrelated
/// branches are not touched. Returns false when no folder matched.
pub fn update_folder<F>(folders: &mut [Folder], id: &str, update: F) -> bool
where
    F: FnOnce(&mut Folder),
{
    match find_folder_mut(folders, id) {
        Some(folder) => {
            update(folder);
            true
        }
        None => false,
    }
}

/// Remove every folder with `id`, each with its whole subtree, from wherever
/// it sits. Returns the removed folders in pre-order.
pub fn remove_folder(folders: &mut Vec<Folder>, id: &str) -> Vec<Folder> {
    let mut removed = Vec::new();
    let mut index = 0;
    while index < folders.len() {
        if folders[index].id == id {
            removed.push(folders.remove(index));
        } else {
            removed.extend(remove_folder(&mut folders[index].subfolders, id));
            index += 1;
        }
    }
    removed
}

/// Pre-order list of every folder
pub fn flatten(folders: &[Folder]) -> Vec<&Folder> {
    flatten_with_depth(folders)
        .into_iter()
        .map(|(_, folder)| folder)
        .collect()
}

/// Pre-order list of every folder with its nesting depth (roots are 0)
pub fn flatten_with_depth(folders: &[Folder]) -> Vec<(usize, &Folder)> {
    let mut result = Vec::new();
    collect_folders(folders, 0, &mut result);
    result
}

fn collect_folders<'a>(folders: &'a [Folder], depth: usize, out: &mut Vec<(usize, &'a Folder)>) {
    for folder in folders {
        out.push((depth, folder));
        collect_folders(&folder.subfolders, depth + 1, out);
    }
}

/// Chain of folders from a root down to (and including) the target
pub fn folder_path<'a>(folders: &'a [Folder], id: &str) -> Option<Vec<&'a Folder>> {
    for folder in folders {
        if folder.id == id {
            return Some(vec![folder]);
        }
        if let Some(mut path) = folder_path(&folder.subfolders, id) {
            path.insert(0, folder);
            return Some(path);
        }
    }
    None
}

/// Every link in the forest, tagged with its owning folder
pub fn all_links(folders: &[Folder]) -> Vec<LinkWithFolder> {
    flatten(folders)
        .into_iter()
        .flat_map(|folder| {
            folder.links.iter().map(move |link| LinkWithFolder {
                link: link.clone(),
                folder_id: folder.id.clone(),
                folder_name: folder.name.clone(),
                folder_color: folder.color.clone(),
            })
        })
        .collect()
}

pub fn stats(folders: &[Folder]) -> ForestStats {
    flatten(folders)
        .into_iter()
        .fold(ForestStats::default(), |acc, folder| ForestStats {
            folder_count: acc.folder_count + 1,
            link_count: acc.link_count + folder.links.len(),
        })
}

/// Fill in fields that older snapshots lack. Missing `subfolders` are
/// already defaulted during deserialization; colors are handled here.
pub fn migrate(folders: &mut [Folder]) {
    for folder in folders.iter_mut() {
        if folder.color.as_deref().map_or(true, str::is_empty) {
            folder.color = Some(DEFAULT_FOLDER_COLOR.to_string());
        }
        migrate(&mut folder.subfolders);
    }
}

/// Parse a serialized forest and run the migration pass over it
pub fn decode_forest(raw: &str) -> serde_json::Result<Vec<Folder>> {
    let mut folders: Vec<Folder> = serde_json::from_str(raw)?;
    migrate(&mut folders);
    Ok(folders)
}

/// Folder ids that occur more than once, in pre-order of their second sighting
pub fn duplicate_folder_ids(folders: &[Folder]) -> Vec<String> {
    let mut seen = HashSet::new();
    flatten(folders)
        .into_iter()
        .filter(|folder| !seen.insert(folder.id.as_str()))
        .map(|folder| folder.id.clone())
        .collect()
}
