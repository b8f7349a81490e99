use std::sync::Arc;

use crate::{
    config::Config,
    db::{FileStore, KeyValueStore, MemoryStore},
    errors::AppResult,
    repositories::{StoredHistoryRepository, StoredMetricsRepository, StoredQuestionRepository},
    services::{
        analytics_service::AnalyticsService, history_service::HistoryService,
        metrics_service::{MetricsCommitter, MetricsSink},
        quiz_session::QuizSessionEngine,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<StoredQuestionRepository>,
    pub history: Arc<StoredHistoryRepository>,
    pub metrics: Arc<StoredMetricsRepository>,
    pub history_service: Arc<HistoryService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        config.validate()?;
        let store = FileStore::open(&config.data_dir).await?;
        log::debug!("Using data directory {}", store.root().display());
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Nothing touches the disk.
    pub fn in_memory(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let questions = Arc::new(StoredQuestionRepository::new(store.clone()));
        let history = Arc::new(StoredHistoryRepository::new(store.clone()));
        let metrics = Arc::new(StoredMetricsRepository::new(store));

        let history_service = Arc::new(HistoryService::new(history.clone(), questions.clone()));
        let analytics_service = Arc::new(AnalyticsService::new(
            history.clone(),
            questions.clone(),
            metrics.clone(),
        ));

        Self {
            questions,
            history,
            metrics,
            history_service,
            analytics_service,
            config: Arc::new(config),
        }
    }

    /// The engine only sees the read side of the library.
    pub fn engine(&self, sink: Arc<dyn MetricsSink>) -> QuizSessionEngine {
        QuizSessionEngine::new(self.questions.clone(), sink)
    }

    pub fn committer(&self) -> MetricsCommitter {
        MetricsCommitter::new(self.questions.clone(), self.metrics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metrics_service::NoopMetricsSink;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn file_backed_state_creates_data_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data_dir = dir.path().join("nested");
        let config = Config::test_config().with_data_dir(&data_dir);

        let state = AppState::new(config).await.expect("state should open");

        assert!(data_dir.is_dir());
        assert!(!state.engine(Arc::new(NoopMetricsSink)).is_active());
    }
}
