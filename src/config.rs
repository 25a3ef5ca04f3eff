// Runtime configuration: where the database lives

use std::path::PathBuf;

use crate::storage::{get_default_db_path, StorageResult};

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "LINK_HUB_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the database path: explicit flag, then `LINK_HUB_DB`, then the
    /// per-user data directory
    pub fn resolve(cli_db_path: Option<PathBuf>) -> StorageResult<Self> {
        let env_db_path = std::env::var_os(DB_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::resolve_from(cli_db_path, env_db_path)
    }

    fn resolve_from(cli_db_path: Option<PathBuf>, env_db_path: Option<PathBuf>) -> StorageResult<Self> {
        let db_path = match cli_db_path.or(env_db_path) {
            Some(path) => path,
            None => get_default_db_path()?,
        };
        Ok(Self { db_path })
    }
}
