use tracing::warn;

use learnsmart_core::FileStorage;

/// Deletes stored files, logging failures instead of returning them.
pub async fn remove_stored_files<I>(storage: &dyn FileStorage, keys: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    let mut removed = 0;
    for key in keys {
        match storage.delete(&key).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(key = %key, error = %e, "Failed to remove stored file"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnsmart_core::LocalFileStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_remove_stored_files_ignores_missing() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf(), "/files".to_string());
        storage.save("a/one.txt", b"hello").await.unwrap();

        let removed = remove_stored_files(
            &storage,
            vec!["a/one.txt".to_string(), "a/missing.txt".to_string()],
        )
        .await;

        assert_eq!(removed, 2);
        assert!(!dir.path().join("a/one.txt").exists());
    }
}
