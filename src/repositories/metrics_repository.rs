use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    db::{load_json, save_json, KeyValueStore, QUESTION_METRICS_KEY},
    errors::AppResult,
    models::domain::{Attempt, QuestionId, QuestionMetrics},
};

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    async fn record(&self, question_id: QuestionId, attempt: &Attempt) -> AppResult<QuestionMetrics>;
    async fn find(&self, question_id: QuestionId) -> AppResult<Option<QuestionMetrics>>;
    async fn find_all(&self) -> AppResult<BTreeMap<QuestionId, QuestionMetrics>>;
}

pub struct StoredMetricsRepository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl StoredMetricsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl MetricsRepository for StoredMetricsRepository {
    async fn record(&self, question_id: QuestionId, attempt: &Attempt) -> AppResult<QuestionMetrics> {
        let _guard = self.write_lock.lock().await;
        let mut all: BTreeMap<QuestionId, QuestionMetrics> =
            load_json(self.store.as_ref(), QUESTION_METRICS_KEY).await?;

        let metrics = all
            .entry(question_id)
            .or_insert_with(|| QuestionMetrics::new(question_id));
        metrics.record(attempt);
        let updated = metrics.clone();

        save_json(self.store.as_ref(), QUESTION_METRICS_KEY, &all).await?;
        Ok(updated)
    }

    async fn find(&self, question_id: QuestionId) -> AppResult<Option<QuestionMetrics>> {
        let mut all = self.find_all().await?;
        Ok(all.remove(&question_id))
    }

    async fn find_all(&self) -> AppResult<BTreeMap<QuestionId, QuestionMetrics>> {
        load_json(self.store.as_ref(), QUESTION_METRICS_KEY).await
    }
}
