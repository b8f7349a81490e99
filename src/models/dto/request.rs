use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::Question;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_timer"))]
pub struct StartOptions {
    #[validate(length(min = 1, message = "bank id must not be empty"))]
    pub bank_id: String,

    #[validate(range(min = 1, message = "at least one question is required"))]
    pub question_count: usize,

    pub tutor_mode: bool,
    pub timer_enabled: bool,
    pub time_per_question: u32, // seconds, ignored unless timer_enabled

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<QuestionFilter>,

    /// Fixes the shuffle; a random seed is drawn when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn validate_timer(options: &StartOptions) -> Result<(), ValidationError> {
    if options.timer_enabled && options.time_per_question == 0 {
        let mut err = ValidationError::new("time_per_question");
        err.message = Some("a timed quiz needs at least one second per question".into());
        return Err(err);
    }
    Ok(())
}

impl StartOptions {
    pub fn new(bank_id: &str, question_count: usize) -> Self {
        StartOptions {
            bank_id: bank_id.to_string(),
            question_count,
            tutor_mode: false,
            timer_enabled: false,
            time_per_question: 0,
            filter: None,
            seed: None,
        }
    }

    pub fn tutor(mut self) -> Self {
        self.tutor_mode = true;
        self
    }

    pub fn timed(mut self, seconds: u32) -> Self {
        self.timer_enabled = true;
        self.time_per_question = seconds;
        self
    }

    pub fn with_filter(mut self, filter: QuestionFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Selection predicates over canonical questions (with their attempt
/// history). Every predicate is independent; the set ones are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilter {
    /// Any-of; empty means no tag restriction.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub unused: bool,
    #[serde(default)]
    pub incorrect: bool,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub flagged: bool,
}

impl QuestionFilter {
    pub fn is_empty(&self) -> bool {
        self == &QuestionFilter::default()
    }

    pub fn matches(&self, question: &Question) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| question.has_tag(t)) {
            return false;
        }
        if self.unused && !question.attempts.is_empty() {
            return false;
        }

        // "incorrect"/"correct" look at the latest attempt only
        let last_correct = question.last_attempt().map(|a| a.is_correct);
        if self.incorrect && last_correct != Some(false) {
            return false;
        }
        if self.correct && last_correct != Some(true) {
            return false;
        }

        !self.flagged || question.flagged
    }
}
