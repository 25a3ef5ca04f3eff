// Local persistence for the folder snapshot and UI settings
// A single SQLite key-value table stands in for browser localStorage

pub mod database;
pub mod snapshot;
pub mod state;

pub use database::{DatabaseManager, StorageError, StorageResult, get_default_db_path};
pub use snapshot::{MemoryBackend, SnapshotBackend};
pub use state::{AppSettings, ViewMode};
