use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::question::{Question, QuestionId};

/// Summary of one finished quiz session. Built once by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistoryRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub score: usize,
    pub total_questions: usize,
    pub bank_id: String,
    pub question_attempts: Vec<AttemptSummary>,
    #[serde(default)]
    pub tutor_mode: bool,
    #[serde(default)]
    pub timer_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_question: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub question_id: QuestionId,
    pub selected_answer: Option<usize>,
    pub is_correct: bool,
    pub flagged: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AttemptSummary {
    /// Uses the most recent attempt; a question never attempted yields a
    /// synthetic non-answer.
    pub fn from_question(question: &Question) -> Self {
        match question.last_attempt() {
            Some(attempt) => AttemptSummary {
                question_id: question.id,
                selected_answer: attempt.selected_answer,
                is_correct: attempt.is_correct,
                flagged: question.flagged,
                tags: attempt.tags.clone(),
            },
            None => AttemptSummary {
                question_id: question.id,
                selected_answer: None,
                is_correct: false,
                flagged: question.flagged,
                tags: question.tags.clone(),
            },
        }
    }
}

impl QuizHistoryRecord {
    pub fn correct_count(&self) -> usize {
        self.question_attempts.iter().filter(|a| a.is_correct).count()
    }

    pub fn answered_count(&self) -> usize {
        self.question_attempts
            .iter()
            .filter(|a| a.selected_answer.is_some())
            .count()
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            self.score as f64 / self.total_questions as f64
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::attempt::Attempt;
    use chrono::Duration;

    #[test]
    fn summary_takes_latest_attempt() {
        let mut question = Question::new(1, "q", &["a", "b"], 1);
        question.attempts.push(Attempt::record(&question, Some(0)));
        question.attempts.push(Attempt::record(&question, Some(1)));

        let summary = AttemptSummary::from_question(&question);

        assert_eq!(summary.selected_answer, Some(1));
        assert!(summary.is_correct);
    }

    #[test]
    fn summary_of_unreached_question_is_a_non_answer() {
        let mut question = Question::new(2, "q", &["a", "b"], 0).with_tags(&["t"]);
        question.flagged = true;

        let summary = AttemptSummary::from_question(&question);

        assert_eq!(summary.selected_answer, None);
        assert!(!summary.is_correct);
        assert!(summary.flagged);
        assert_eq!(summary.tags, vec!["t".to_string()]);
    }

    #[test]
    fn record_counts_and_accuracy() {
        let start = Utc::now();
        let record = QuizHistoryRecord {
            id: "r1".to_string(),
            start_time: start,
            end_time: start + Duration::seconds(90),
            score: 1,
            total_questions: 2,
            bank_id: "b".to_string(),
            question_attempts: vec![
                AttemptSummary {
                    question_id: 1,
                    selected_answer: Some(0),
                    is_correct: true,
                    flagged: false,
                    tags: vec![],
                },
                AttemptSummary {
                    question_id: 2,
                    selected_answer: None,
                    is_correct: false,
                    flagged: false,
                    tags: vec![],
                },
            ],
            tutor_mode: false,
            timer_enabled: false,
            time_per_question: None,
        };

        assert_eq!(record.correct_count(), 1);
        assert_eq!(record.answered_count(), 1);
        assert!((record.accuracy() - 0.5).abs() < f64::EPSILON);
        assert_eq!(record.duration_seconds(), 90);
    }
}
