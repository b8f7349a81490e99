pub mod history_repository;
pub mod metrics_repository;
pub mod question_repository;

pub use history_repository::{HistoryRepository, StoredHistoryRepository};
pub use metrics_repository::{MetricsRepository, StoredMetricsRepository};
pub use question_repository::{
    QuestionLibraryRepository, QuestionRepository, StoredQuestionRepository,
};
