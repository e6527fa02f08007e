use std::env;
use std::path::PathBuf;

use crate::env_or;

const DEFAULT_MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Directory uploaded material files are written to.
    pub base_dir: PathBuf,
    /// Public prefix for stored files; the API serves `base_dir` at `/files`.
    pub base_url: String,
    pub max_file_size: usize,
    /// Empty means the storage backend's built-in allow-list.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            base_dir: PathBuf::from(
                env::var("STORAGE_DIR").unwrap_or_else(|_| "storage/uploads".to_string()),
            ),
            base_url: env::var("STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            max_file_size: env_or("STORAGE_MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE),
            allowed_mime_types: env::var("STORAGE_ALLOWED_MIME_TYPES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
