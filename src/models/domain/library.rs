use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::bank::{BankDefinition, BankSummary, QuestionBank};
use crate::models::domain::question::{Question, QuestionId};

/// Everything persisted under the `questionLibrary` key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionLibrary {
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<Question>,
    #[serde(default)]
    #[validate(nested)]
    pub banks: Vec<BankDefinition>,
}

impl QuestionLibrary {
    pub fn new(questions: Vec<Question>, banks: Vec<BankDefinition>) -> Self {
        QuestionLibrary { questions, banks }
    }

    /// Field validation plus the cross-entity rules `validator` cannot express.
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;

        let mut question_ids = HashSet::new();
        if let Some(dup) = self.questions.iter().find(|q| !question_ids.insert(q.id)) {
            return Err(AppError::ValidationError(format!(
                "Question id {} appears more than once",
                dup.id
            )));
        }

        let mut bank_ids = HashSet::new();
        if let Some(dup) = self.banks.iter().find(|b| !bank_ids.insert(b.id.as_str())) {
            return Err(AppError::ValidationError(format!(
                "Bank id '{}' appears more than once",
                dup.id
            )));
        }

        Ok(())
    }

    pub fn bank(&self, id: &str) -> Option<QuestionBank> {
        self.banks
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.resolve(&self.questions))
    }

    pub fn bank_summaries(&self) -> Vec<BankSummary> {
        self.banks
            .iter()
            .map(|b| b.resolve(&self.questions).summary())
            .collect()
    }

    pub fn question_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }
}
