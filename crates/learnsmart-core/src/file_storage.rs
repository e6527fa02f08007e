//! Storage for uploaded course material files.
//!
//! Materials store a storage *key* (e.g. `materials/<course>/<module>/<id>.pdf`)
//! rather than a path or URL, so the backend can be swapped without touching
//! the rows. Deleting a material, a module with `cascade`, or a whole course
//! removes the stored files through [`FileStorage::delete`].
//!
//! # Example
//!
//! ```ignore
//! use learnsmart_core::file_storage::{FileStorage, LocalFileStorage};
//!
//! let storage = LocalFileStorage::new("./storage/uploads".into(), "http://localhost:3000/files".into());
//! storage.check_upload("application/pdf", bytes.len())?;
//! let key = storage.save("materials/abc/def/1.pdf", &bytes).await?;
//! let url = storage.get_url(&key)?;
//! storage.delete(&key).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

pub const DEFAULT_MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "image/png",
    "image/jpeg",
    "video/mp4",
];

/// Abstract storage backend. Implementations must be shareable across requests.
pub trait FileStorage: Send + Sync {
    /// Stores `content` under `key` and returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Deletes the file under `key`. A missing file is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Public URL for `key`.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;

    /// Rejects uploads whose MIME type or size the backend will not accept.
    fn check_upload(&self, mime_type: &str, size: usize) -> Result<(), StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    InvalidFileSize { max_bytes: usize },
    InvalidMimeType { received: String, allowed: Vec<String> },
    EmptyFile,
    IoError(std::io::Error),
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => write!(
                f,
                "MIME type '{}' not allowed. Allowed types: {}",
                received,
                allowed.join(", ")
            ),
            Self::EmptyFile => write!(f, "File is empty"),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Files on the local disk, served by the API under `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
    allowed_mime_types: Vec<String>,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    pub fn with_limits(
        base_dir: PathBuf,
        base_url: String,
        max_file_size: usize,
        allowed_mime_types: Vec<String>,
    ) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
            allowed_mime_types,
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    fn check_upload(&self, mime_type: &str, size: usize) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }
        if size > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }
        // Browsers append parameters such as `; charset=utf-8`.
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self.allowed_mime_types.iter().any(|m| *m == essence) {
            return Err(StorageError::InvalidMimeType {
                received: mime_type.to_string(),
                allowed: self.allowed_mime_types.clone(),
            });
        }
        Ok(())
    }
}

/// File extension used for stored keys, derived from the MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.split(';').next().unwrap_or_default().trim() {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "application/vnd.ms-powerpoint" => "ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        "text/plain" => "txt",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "video/mp4" => "mp4",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_storage() -> (LocalFileStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:3000/files/".to_string(),
        );
        (storage, dir)
    }

    #[test]
    fn test_validate_key() {
        assert!(LocalFileStorage::validate_key("materials/a-1/b_2/file.pdf").is_ok());
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("\\windows").is_err());
        assert!(LocalFileStorage::validate_key("materials/with space.pdf").is_err());
        assert!(LocalFileStorage::validate_key("").is_err());
    }

    #[test]
    fn test_get_url_trims_trailing_slash() {
        let (storage, _dir) = temp_storage();
        assert_eq!(
            storage.get_url("materials/x.pdf").unwrap(),
            "http://localhost:3000/files/materials/x.pdf"
        );
    }

    #[test]
    fn test_check_upload() {
        let storage = LocalFileStorage::with_limits(
            PathBuf::from("./unused"),
            "http://localhost".to_string(),
            10,
            vec!["application/pdf".to_string()],
        );
        assert!(storage.check_upload("application/pdf", 5).is_ok());
        assert!(storage.check_upload("Application/PDF; charset=binary", 5).is_ok());
        assert!(matches!(
            storage.check_upload("application/pdf", 0),
            Err(StorageError::EmptyFile)
        ));
        assert!(matches!(
            storage.check_upload("application/pdf", 11),
            Err(StorageError::InvalidFileSize { max_bytes: 10 })
        ));
        assert!(matches!(
            storage.check_upload("image/gif", 5),
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("application/pdf"), "pdf");
        assert_eq!(extension_for_mime("text/plain; charset=utf-8"), "txt");
        assert_eq!(extension_for_mime("application/x-unknown"), "bin");
    }

    #[tokio::test]
    async fn test_save_and_delete_round_trip_on_disk() {
        let (storage, _dir) = temp_storage();
        let key = "materials/course/module/notes.txt";

        storage.save(key, b"hello").await.unwrap();
        let path = storage.base_dir().join(key);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello");

        storage.delete(key).await.unwrap();
        assert!(!path.exists());

        // Deleting twice is fine.
        storage.delete(key).await.unwrap();
    }
}
