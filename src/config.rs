use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_question_count: usize,
    pub default_time_per_question: u32,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            data_dir: env::var("QUIZ_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            default_question_count: env::var("QUIZ_DEFAULT_QUESTION_COUNT")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(10),
            default_time_per_question: env::var("QUIZ_DEFAULT_TIME_PER_QUESTION")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),
            log_level: env::var("QUIZ_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Rejects settings that would make every quiz fail to start.
    pub fn validate(&self) -> AppResult<()> {
        if self.default_question_count == 0 {
            return Err(AppError::ValidationError(
                "QUIZ_DEFAULT_QUESTION_COUNT must be at least 1".to_string(),
            ));
        }

        if self.default_time_per_question == 0 {
            return Err(AppError::ValidationError(
                "QUIZ_DEFAULT_TIME_PER_QUESTION must be at least 1 second".to_string(),
            ));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::ValidationError(
                "QUIZ_DATA_DIR must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn test_config() -> Self {
        Self {
            data_dir: PathBuf::from("target/test-data"),
            default_question_count: 5,
            default_time_per_question: 10,
            log_level: "debug".to_string(),
        }
    }
}
