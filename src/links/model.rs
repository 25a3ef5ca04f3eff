// Link and folder data model
// Field names serialize in camelCase so snapshots stay readable by the web front-end

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

/// Color given to folders created without one, and to legacy records on load
pub const DEFAULT_FOLDER_COLOR: &str = "#6b7280";

/// Named colors offered by folder color pickers
pub const FOLDER_COLORS: [FolderColor; 9] = [
    FolderColor { name: "Gris", value: "#6b7280" },
    FolderColor { name: "Rouge", value: "#ef4444" },
    FolderColor { name: "Orange", value: "#f97316" },
    FolderColor { name: "Jaune", value: "#eab308" },
    FolderColor { name: "Vert", value: "#22c55e" },
    FolderColor { name: "Bleu", value: "#3b82f6" },
    FolderColor { name: "Indigo", value: "#6366f1" },
    FolderColor { name: "Violet", value: "#8b5cf6" },
    FolderColor { name: "Rose", value: "#ec4899" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FolderColor {
    pub name: &'static str,
    pub value: &'static str,
}

/// A bookmarked page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form note entered alongside the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

/// A folder node; `subfolders` makes every top-level folder the root of a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<Link>,
    // Older snapshots predate nesting and omit this field or store null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subfolders: Vec<Folder>,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Reads a list field, treating an explicit `null` like a missing field
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Folder {
    /// Color to render, substituting the neutral default when unset
    pub fn display_color(&self) -> &str {
        match self.color.as_deref() {
            Some(color) if !color.is_empty() => color,
            _ => DEFAULT_FOLDER_COLOR,
        }
    }
}

/// Input for creating a new link
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub favicon: Option<String>,
}

/// Partial update merged into an existing link; `None` fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub favicon: Option<String>,
}

impl LinkUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.comment.is_none()
            && self.favicon.is_none()
    }

    pub(crate) fn apply(self, link: &mut Link) {
        if let Some(title) = self.title {
            link.title = title;
        }
        if let Some(url) = self.url {
            link.url = url;
        }
        if let Some(description) = self.description {
            link.description = Some(description);
        }
        if let Some(comment) = self.comment {
            link.comment = Some(comment);
        }
        if let Some(favicon) = self.favicon {
            link.favicon = Some(favicon);
        }
    }
}

/// A link paired with the folder that owns it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkWithFolder {
    pub link: Link,
    pub folder_id: String,
    pub folder_name: String,
    pub folder_color: Option<String>,
}

/// Folder and link totals across the whole forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestStats {
    pub folder_count: usize,
    pub link_count: usize,
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn seed_link(id: &str, title: &str, url: &str, description: &str, created_at: i64) -> Link {
    Link {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        description: Some(description.to_string()),
        comment: None,
        favicon: None,
        created_at,
    }
}

/// Forest used when nothing has been persisted yet
pub fn default_folders() -> Vec<Folder> {
    let now = now_millis();
    vec![
        Folder {
            id: "1".to_string(),
            name: "Favoris".to_string(),
            color: Some("#3b82f6".to_string()),
            links: vec![
                seed_link("1-1", "Google", "https://google.com", "Moteur de recherche", now),
                seed_link("1-2", "GitHub", "https://github.com", "Plateforme de développement", now),
            ],
            subfolders: Vec::new(),
            is_expanded: true,
            created_at: now,
            parent_id: None,
        },
        Folder {
            id: "2".to_string(),
            name: "Travail".to_string(),
            color: Some("#22c55e".to_string()),
            links: vec![seed_link(
                "2-1",
                "Notion",
                "https://notion.so",
                "Espace de travail collaboratif",
                now,
            )],
            subfolders: Vec::new(),
            is_expanded: false,
            created_at: now,
            parent_id: None,
        },
    ]
}
