use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppResult;

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

pub const QUESTION_LIBRARY_KEY: &str = "questionLibrary";
pub const QUIZ_HISTORY_KEY: &str = "quizHistory";
pub const QUESTION_METRICS_KEY: &str = "questionMetricsStore";

/// Opaque string blobs under descriptive keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// Missing keys read as `T::default()`.
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    match store.get(key).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(T::default()),
    }
}

pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}
