// Folder/link tree: data model, recursive helpers, and the persisted store

pub mod model;
pub mod search;
pub mod store;
pub mod tree;
pub mod url;

pub use model::{
    Folder, FolderColor, ForestStats, Link, LinkUpdate, LinkWithFolder, NewLink,
    DEFAULT_FOLDER_COLOR, FOLDER_COLORS,
};
pub use store::{LinkTreeStore, STORAGE_KEY};
