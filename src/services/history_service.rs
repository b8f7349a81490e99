use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::QuizHistoryRecord,
    repositories::{HistoryRepository, QuestionLibraryRepository},
};

pub struct HistoryService {
    history: Arc<dyn HistoryRepository>,
    library: Arc<dyn QuestionLibraryRepository>,
}

impl HistoryService {
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        library: Arc<dyn QuestionLibraryRepository>,
    ) -> Self {
        Self { history, library }
    }

    /// Persists a finished session, then copies its final flag state onto
    /// the canonical questions. Once the record is saved a failed flag
    /// sync is logged and does not fail the call.
    pub async fn finish(&self, record: QuizHistoryRecord) -> AppResult<QuizHistoryRecord> {
        let record = self.history.create(record).await?;

        for summary in &record.question_attempts {
            match self.library.set_flag(summary.question_id, summary.flagged).await {
                Ok(()) => {}
                Err(AppError::NotFound(msg)) => {
                    log::warn!("Skipping flag sync for record {}: {}", record.id, msg)
                }
                Err(err) => log::warn!(
                    "Flag sync failed for question {} in record {}: {}",
                    summary.question_id,
                    record.id,
                    err
                ),
            }
        }

        log::info!(
            "Saved quiz history {} ({}/{})",
            record.id,
            record.score,
            record.total_questions
        );
        Ok(record)
    }

    /// Newest `limit` records, optionally restricted to one bank.
    pub async fn recent(
        &self,
        bank_id: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<QuizHistoryRecord>> {
        match bank_id {
            Some(bank_id) => {
                let mut records = self.history.list_by_bank(bank_id).await?;
                records.truncate(limit);
                Ok(records)
            }
            None => {
                let (records, _) = self.history.list(0, limit).await?;
                Ok(records)
            }
        }
    }

    /// Drops every history record. Returns how many were removed.
    pub async fn clear(&self) -> AppResult<usize> {
        let (_, total) = self.history.list(0, 0).await?;
        self.history.clear().await?;
        log::info!("Cleared {} quiz history records", total);
        Ok(total)
    }

    pub async fn get(&self, id: &str) -> AppResult<QuizHistoryRecord> {
        self.history
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("History record '{}' not found", id)))
    }
}
