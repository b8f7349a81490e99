use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::attempt::Attempt;
use crate::models::domain::question::QuestionId;

/// Running per-question aggregate stored under `questionMetricsStore`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetrics {
    pub question_id: QuestionId,
    pub attempts: u32,
    pub correct: u32,
    pub streak: u32,
    pub last_selected_answer: Option<usize>,
    pub last_correct: Option<bool>,
    pub last_attempted_at: Option<DateTime<Utc>>,
    pub flagged: bool,
}

impl QuestionMetrics {
    pub fn new(question_id: QuestionId) -> Self {
        QuestionMetrics {
            question_id,
            ..Default::default()
        }
    }

    pub fn record(&mut self, attempt: &Attempt) {
        self.attempts += 1;
        if attempt.is_correct {
            self.correct += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        self.last_selected_answer = attempt.selected_answer;
        self.last_correct = Some(attempt.is_correct);
        self.last_attempted_at = Some(attempt.timestamp);
        self.flagged = attempt.flagged;
    }

    pub fn is_used(&self) -> bool {
        self.attempts > 0
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::Question;

    #[test]
    fn record_tracks_streak_and_last_outcome() {
        let question = Question::new(5, "q", &["a", "b"], 0);
        let mut metrics = QuestionMetrics::new(5);

        metrics.record(&Attempt::record(&question, Some(0)));
        metrics.record(&Attempt::record(&question, Some(0)));
        assert_eq!(metrics.streak, 2);

        metrics.record(&Attempt::no_answer(&question));

        assert_eq!(metrics.attempts, 3);
        assert_eq!(metrics.correct, 2);
        assert_eq!(metrics.streak, 0);
        assert_eq!(metrics.last_correct, Some(false));
        assert_eq!(metrics.last_selected_answer, None);
        assert!(metrics.is_used());
    }

    #[test]
    fn fresh_metrics_are_unused() {
        let metrics = QuestionMetrics::new(1);

        assert!(!metrics.is_used());
        assert_eq!(metrics.accuracy(), 0.0);
    }
}
