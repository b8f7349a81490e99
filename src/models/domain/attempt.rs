use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::question::Question;

/// One answer event. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub selected_answer: Option<usize>,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
    pub flagged: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Attempt {
    /// Snapshot the question's flag and tags at the moment of answering.
    pub fn record(question: &Question, selected_answer: Option<usize>) -> Self {
        Attempt {
            selected_answer,
            is_correct: question.is_correct(selected_answer),
            timestamp: Utc::now(),
            flagged: question.flagged,
            tags: question.tags.clone(),
        }
    }

    /// Skips and timeouts share this shape.
    pub fn no_answer(question: &Question) -> Self {
        Self::record(question, None)
    }

    pub fn is_answered(&self) -> bool {
        self.selected_answer.is_some()
    }
}
