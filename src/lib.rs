// Link Hub: a personal bookmark organizer
// Links live in a forest of nested, color-tagged folders persisted to a local SQLite file

// Module declarations
pub mod commands;
pub mod config;
pub mod export;
pub mod links;
pub mod storage;

pub use commands::AppState;
pub use config::Config;
pub use links::{Folder, Link, LinkTreeStore};
