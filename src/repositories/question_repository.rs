use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    db::{load_json, save_json, KeyValueStore, QUESTION_LIBRARY_KEY},
    errors::{AppError, AppResult},
    models::domain::{Attempt, BankSummary, Question, QuestionBank, QuestionId, QuestionLibrary},
};

/// Read-only view handed to the quiz engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn find_bank(&self, id: &str) -> AppResult<Option<QuestionBank>>;
    async fn list_banks(&self) -> AppResult<Vec<BankSummary>>;
}

/// Write access for the surrounding application.
#[async_trait]
pub trait QuestionLibraryRepository: QuestionRepository {
    async fn load(&self) -> AppResult<QuestionLibrary>;
    async fn save(&self, library: QuestionLibrary) -> AppResult<()>;
    async fn update_attempt(&self, question_id: QuestionId, attempt: Attempt) -> AppResult<()>;
    async fn set_flag(&self, question_id: QuestionId, flagged: bool) -> AppResult<()>;
}

pub struct StoredQuestionRepository {
    store: Arc<dyn KeyValueStore>,
    // serializes read-modify-write cycles on the library blob
    write_lock: Mutex<()>,
}

impl StoredQuestionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn modify_question<F>(&self, question_id: QuestionId, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut Question) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut library: QuestionLibrary =
            load_json(self.store.as_ref(), QUESTION_LIBRARY_KEY).await?;

        let question = library.question_mut(question_id).ok_or_else(|| {
            AppError::NotFound(format!("Question with id '{}' not found", question_id))
        })?;
        change(question);

        save_json(self.store.as_ref(), QUESTION_LIBRARY_KEY, &library).await
    }
}

#[async_trait]
impl QuestionRepository for StoredQuestionRepository {
    async fn find_bank(&self, id: &str) -> AppResult<Option<QuestionBank>> {
        let library = self.load().await?;
        Ok(library.bank(id))
    }

    async fn list_banks(&self) -> AppResult<Vec<BankSummary>> {
        let library = self.load().await?;
        Ok(library.bank_summaries())
    }
}

#[async_trait]
impl QuestionLibraryRepository for StoredQuestionRepository {
    async fn load(&self) -> AppResult<QuestionLibrary> {
        load_json(self.store.as_ref(), QUESTION_LIBRARY_KEY).await
    }

    async fn save(&self, library: QuestionLibrary) -> AppResult<()> {
        library.check()?;

        let _guard = self.write_lock.lock().await;
        save_json(self.store.as_ref(), QUESTION_LIBRARY_KEY, &library).await?;

        log::info!(
            "Saved question library: {} questions, {} banks",
            library.questions.len(),
            library.banks.len()
        );
        Ok(())
    }

    async fn update_attempt(&self, question_id: QuestionId, attempt: Attempt) -> AppResult<()> {
        self.modify_question(question_id, move |question| {
            question.flagged = attempt.flagged;
            question.attempts.push(attempt);
        })
        .await
    }

    async fn set_flag(&self, question_id: QuestionId, flagged: bool) -> AppResult<()> {
        self.modify_question(question_id, move |question| question.flagged = flagged)
            .await
    }
}
