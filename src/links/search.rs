// Link search for the header search bar

use super::model::{Folder, LinkWithFolder};
use super::tree;

/// Case-insensitive match on title, url or description.
///
/// Without a scope every link in the forest is a candidate; with one, only the
/// direct links of that folder are (an unknown scope yields nothing). A blank
/// query returns all candidates.
pub fn search_links(folders: &[Folder], query: &str, scope: Option<&str>) -> Vec<LinkWithFolder> {
    let candidates = match scope {
        Some(folder_id) => match tree::find_folder(folders, folder_id) {
            Some(folder) => folder
                .links
                .iter()
                .map(|link| LinkWithFolder {
                    link: link.clone(),
                    folder_id: folder.id.clone(),
                    folder_name: folder.name.clone(),
                    folder_color: folder.color.clone(),
                })
                .collect(),
            None => Vec::new(),
        },
        None => tree::all_links(folders),
    };

    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|entry| {
            let link = &entry.link;
            link.title.to_lowercase().contains(&query)
                || link.url.to_lowercase().contains(&query)
                || link
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::tree::tests::{folder, link};

    fn sample() -> Vec<Folder> {
        let mut docs = link("d1", "Rust Book");
        docs.description = Some("The official GUIDE".to_string());
        let mut child = folder("child", "Docs", vec![]);
        child.links.push(docs);

        let mut root = folder("root", "Dev", vec![child]);
        root.links.push(link("gh", "GitHub"));
        root.links.push(link("crates", "crates.io"));
        vec![root]
    }

    #[test]
    fn test_search_matches_title_url_description() {
        let folders = sample();

        let by_title = search_links(&folders, "github", None);
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].link.id, "gh");

        // url is https://crates.example
        let by_url = search_links(&folders, "CRATES.EXAMPLE", None);
        assert_eq!(by_url.len(), 1);

        let by_description = search_links(&folders, "guide", None);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].folder_id, "child");
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let folders = sample();
        assert_eq!(search_links(&folders, "   ", None).len(), 3);
    }

    #[test]
    fn test_scoped_search_uses_direct_links_only() {
        let folders = sample();

        assert_eq!(search_links(&folders, "", Some("root")).len(), 2);
        assert!(search_links(&folders, "rust", Some("root")).is_empty());
        assert_eq!(search_links(&folders, "rust", Some("child")).len(), 1);
        assert!(search_links(&folders, "", Some("missing")).is_empty());
    }
}
