use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::db::KeyValueStore;
use crate::errors::{AppError, AppResult};

/// One `<key>.json` file per key under a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::StorageError(format!(
                "Failed to create data directory {}: {}",
                root.display(),
                e
            ))
        })?;

        log::debug!("Opened file store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::ValidationError(format!(
                "Invalid storage key '{}'",
                key
            )));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let path = self.path_for(key)?;
        // Readers never see a half-written file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn values_survive_reopen() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::open(temp.path().join("data"))
            .await
            .expect("open should create directory");

        store
            .set("quizHistory", "[]".to_string())
            .await
            .expect("set should work");

        let reopened = FileStore::open(temp.path().join("data"))
            .await
            .expect("reopen should work");
        assert_eq!(
            reopened.get("quizHistory").await.expect("get should work"),
            Some("[]".to_string())
        );
        assert!(reopened.root().join("quizHistory.json").exists());
    }

    #[tokio::test]
    async fn missing_key_reads_as_none_and_removes_cleanly() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::open(temp.path()).await.expect("open should work");

        assert_eq!(store.get("nothing").await.expect("get should work"), None);
        store.remove("nothing").await.expect("remove should work");
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::open(temp.path()).await.expect("open should work");

        let result = store.set("../escape", "x".to_string()).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
