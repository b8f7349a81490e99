use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::domain::{AttemptSummary, QuizHistoryRecord};
use crate::services::quiz_session::state::ActiveSession;

impl ActiveSession {
    /// Every session question gets exactly one summary, reached or not.
    pub fn into_record(self, ended_at: DateTime<Utc>) -> QuizHistoryRecord {
        let question_attempts: Vec<AttemptSummary> = self
            .questions
            .iter()
            .map(AttemptSummary::from_question)
            .collect();
        let score = question_attempts.iter().filter(|a| a.is_correct).count();
        debug_assert_eq!(score, self.score);

        QuizHistoryRecord {
            id: Uuid::new_v4().to_string(),
            start_time: self.started_at,
            end_time: ended_at,
            score,
            total_questions: self.questions.len(),
            bank_id: self.bank_id,
            question_attempts,
            tutor_mode: self.tutor_mode,
            timer_enabled: self.countdown.enabled(),
            time_per_question: self.countdown.seconds_per_question(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Question;
    use crate::models::dto::request::StartOptions;

    #[test]
    fn record_pads_unreached_questions() {
        let questions = (1..=4)
            .map(|id| Question::new(id, "q", &["a", "b"], 0))
            .collect();
        let options = StartOptions::new("bank", 4).timed(15);
        let mut session = ActiveSession::new("bank".to_string(), questions, &options);
        session.record(Some(0));
        session.advance();
        session.record(Some(1));

        let record = session.into_record(Utc::now());

        assert_eq!(record.total_questions, 4);
        assert_eq!(record.question_attempts.len(), 4);
        assert_eq!(record.score, 1);
        assert_eq!(record.time_per_question, Some(15));
        assert!(record.timer_enabled);
        let unreached: Vec<_> = record.question_attempts[2..]
            .iter()
            .map(|a| (a.selected_answer, a.is_correct))
            .collect();
        assert_eq!(unreached, vec![(None, false), (None, false)]);
    }

    #[test]
    fn record_ids_are_unique() {
        let make = || {
            let questions = vec![Question::new(1, "q", &["a", "b"], 0)];
            ActiveSession::new("b".to_string(), questions, &StartOptions::new("b", 1))
                .into_record(Utc::now())
        };

        assert_ne!(make().id, make().id);
    }
}
