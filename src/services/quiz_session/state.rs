use chrono::{DateTime, Utc};

use crate::models::domain::{Attempt, Question, QuestionId};
use crate::models::dto::request::StartOptions;
use crate::services::timer::Countdown;

/// Working data of one in-flight session.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub bank_id: String,
    pub questions: Vec<Question>, // fixed for the session
    pub current_index: usize,
    /// Highest index shown so far.
    pub furthest_index: usize,
    pub score: usize,
    pub selected_answer: Option<usize>,
    pub answered: bool,
    pub tutor_mode: bool,
    pub countdown: Countdown,
    pub paused: bool,
    pub started_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new(bank_id: String, questions: Vec<Question>, options: &StartOptions) -> Self {
        ActiveSession {
            bank_id,
            questions,
            current_index: 0,
            furthest_index: 0,
            score: 0,
            selected_answer: None,
            answered: false,
            tutor_mode: options.tutor_mode,
            countdown: Countdown::new(options.timer_enabled, options.time_per_question),
            paused: false,
            started_at: Utc::now(),
        }
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_mut(&mut self) -> &mut Question {
        &mut self.questions[self.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| !q.attempts.is_empty())
            .count()
    }

    /// Finalizes the current question with `selected`. Callers check that
    /// it is not already answered.
    pub fn record(&mut self, selected: Option<usize>) -> (QuestionId, Attempt) {
        let attempt = Attempt::record(self.current(), selected);
        if attempt.is_correct {
            self.score += 1;
        }
        self.selected_answer = attempt.selected_answer;
        self.answered = true;

        let question = self.current_mut();
        question.attempts.push(attempt.clone());
        let question_id = question.id;
        debug_assert!(self.score <= self.answered_count());
        (question_id, attempt)
    }

    /// Moves forward one question. Returns false on the last question.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current_index += 1;
        self.furthest_index = self.furthest_index.max(self.current_index);
        self.load_current();
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        self.load_current();
        true
    }

    /// Records a non-answer for every question already shown but never
    /// answered, including ones left behind by going back.
    pub fn finalize_reached(&mut self) -> Vec<(QuestionId, Attempt)> {
        let reached = self.furthest_index + 1;
        let mut finalized = Vec::new();
        for question in self.questions[..reached]
            .iter_mut()
            .filter(|q| q.attempts.is_empty())
        {
            let attempt = Attempt::no_answer(question);
            question.attempts.push(attempt.clone());
            finalized.push((question.id, attempt));
        }
        if self.current().last_attempt().is_some() {
            self.answered = true;
        }
        finalized
    }

    /// Entering a question shows whatever was already recorded for it.
    fn load_current(&mut self) {
        let (answered, selected) = match self.current().last_attempt() {
            Some(attempt) => (true, attempt.selected_answer),
            None => (false, None),
        };
        self.answered = answered;
        self.selected_answer = selected;
        self.countdown.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(count: u64) -> ActiveSession {
        let questions = (1..=count)
            .map(|id| Question::new(id, "q", &["a", "b"], 0))
            .collect();
        ActiveSession::new("bank".to_string(), questions, &StartOptions::new("bank", 1))
    }

    #[test]
    fn record_scores_and_marks_answered() {
        let mut s = session(2);

        let (id, attempt) = s.record(Some(0));

        assert_eq!(id, 1);
        assert!(attempt.is_correct);
        assert_eq!(s.score, 1);
        assert!(s.answered);
        assert_eq!(s.selected_answer, Some(0));
        assert_eq!(s.current().attempts.len(), 1);
    }

    #[test]
    fn advance_and_retreat_restore_recorded_state() {
        let mut s = session(2);
        s.record(Some(1));

        assert!(s.advance());
        assert!(!s.answered);
        assert_eq!(s.selected_answer, None);
        assert!(!s.advance());

        assert!(s.retreat());
        assert!(s.answered);
        assert_eq!(s.selected_answer, Some(1));
        assert!(!s.retreat());
    }

    #[test]
    fn finalize_reached_covers_questions_left_by_going_back() {
        let mut s = session(4);
        s.record(Some(0));
        s.advance();
        s.retreat();

        let finalized = s.finalize_reached();

        let ids: Vec<QuestionId> = finalized.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2]);
        assert!(finalized.iter().all(|(_, a)| !a.is_answered()));
        assert_eq!(s.answered_count(), 2);
        assert_eq!(s.score, 1);
        assert!(s.questions[2].attempts.is_empty());
    }

    #[test]
    fn answered_count_tracks_attempted_questions() {
        let mut s = session(3);
        s.record(None);
        s.advance();
        s.record(Some(0));

        assert_eq!(s.answered_count(), 2);
        assert!(s.score <= s.answered_count());
    }
}
