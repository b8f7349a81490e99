use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    db::{load_json, save_json, KeyValueStore, QUIZ_HISTORY_KEY},
    errors::{AppError, AppResult},
    models::domain::QuizHistoryRecord,
};

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn create(&self, record: QuizHistoryRecord) -> AppResult<QuizHistoryRecord>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizHistoryRecord>>;
    async fn find_all(&self) -> AppResult<Vec<QuizHistoryRecord>>;
    /// Newest first, with the total count before pagination.
    async fn list(&self, offset: usize, limit: usize) -> AppResult<(Vec<QuizHistoryRecord>, usize)>;
    async fn list_by_bank(&self, bank_id: &str) -> AppResult<Vec<QuizHistoryRecord>>;
    async fn clear(&self) -> AppResult<()>;
}

pub struct StoredHistoryRepository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl StoredHistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn newest_first(&self) -> AppResult<Vec<QuizHistoryRecord>> {
        let mut records: Vec<QuizHistoryRecord> =
            load_json(self.store.as_ref(), QUIZ_HISTORY_KEY).await?;
        records.sort_by(|a, b| b.end_time.cmp(&a.end_time));
        Ok(records)
    }
}

#[async_trait]
impl HistoryRepository for StoredHistoryRepository {
    async fn create(&self, record: QuizHistoryRecord) -> AppResult<QuizHistoryRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<QuizHistoryRecord> =
            load_json(self.store.as_ref(), QUIZ_HISTORY_KEY).await?;

        if records.iter().any(|r| r.id == record.id) {
            return Err(AppError::AlreadyExists(format!(
                "History record with id '{}' already exists",
                record.id
            )));
        }

        records.push(record.clone());
        save_json(self.store.as_ref(), QUIZ_HISTORY_KEY, &records).await?;
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizHistoryRecord>> {
        let records: Vec<QuizHistoryRecord> =
            load_json(self.store.as_ref(), QUIZ_HISTORY_KEY).await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    async fn find_all(&self) -> AppResult<Vec<QuizHistoryRecord>> {
        self.newest_first().await
    }

    async fn list(&self, offset: usize, limit: usize) -> AppResult<(Vec<QuizHistoryRecord>, usize)> {
        let records = self.newest_first().await?;
        let total = records.len();
        let page = records.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn list_by_bank(&self, bank_id: &str) -> AppResult<Vec<QuizHistoryRecord>> {
        let records = self.newest_first().await?;
        Ok(records.into_iter().filter(|r| r.bank_id == bank_id).collect())
    }

    async fn clear(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(QUIZ_HISTORY_KEY).await
    }
}
