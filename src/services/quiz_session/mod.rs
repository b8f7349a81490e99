//! The quiz session state machine.
//!
//! `Idle -> InProgress -> Answered -> InProgress ... -> Completed`, with
//! `Paused` orthogonal to the two active phases. Every mutating call runs
//! to completion and reports a [`Transition`]; calls whose preconditions do
//! not hold (double submits, stale timer callbacks, out-of-range
//! navigation) are ignored rather than treated as errors. Only `start`
//! can fail.

mod record;
mod snapshot;
mod state;

use std::sync::Arc;

use chrono::Utc;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Question, QuizHistoryRecord},
        dto::request::StartOptions,
    },
    repositories::QuestionRepository,
    services::metrics_service::MetricsSink,
};

pub use snapshot::{SessionPhase, SessionSnapshot};
use state::ActiveSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    Applied,
    Completed(QuizHistoryRecord),
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }

    pub fn into_record(self) -> Option<QuizHistoryRecord> {
        match self {
            Transition::Completed(record) => Some(record),
            _ => None,
        }
    }
}

enum EngineState {
    Idle,
    Active(ActiveSession),
    Completed,
}

pub struct QuizSessionEngine {
    repository: Arc<dyn QuestionRepository>,
    metrics: Arc<dyn MetricsSink>,
    state: EngineState,
    last_record: Option<QuizHistoryRecord>,
}

impl QuizSessionEngine {
    pub fn new(repository: Arc<dyn QuestionRepository>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            repository,
            metrics,
            state: EngineState::Idle,
            last_record: None,
        }
    }

    /// Resolves the bank, filters it, shuffles, and takes `question_count`
    /// attempt-free copies. Nothing changes unless every check passes.
    pub async fn start(&mut self, options: StartOptions) -> AppResult<()> {
        options.validate()?;

        if self.is_active() {
            return Err(AppError::ValidationError(
                "A quiz session is already in progress".to_string(),
            ));
        }

        let bank = self
            .repository
            .find_bank(&options.bank_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question bank '{}' not found", options.bank_id))
            })?;

        let mut pool: Vec<&Question> = match &options.filter {
            Some(filter) => bank.questions.iter().filter(|q| filter.matches(q)).collect(),
            None => bank.questions.iter().collect(),
        };

        if options.question_count > pool.len() {
            return Err(AppError::InsufficientQuestions {
                requested: options.question_count,
                available: pool.len(),
            });
        }

        let seed = options.seed.unwrap_or_else(rand::random);
        pool.shuffle(&mut StdRng::seed_from_u64(seed));
        let questions: Vec<Question> = pool
            .into_iter()
            .take(options.question_count)
            .map(Question::session_copy)
            .collect();

        log::info!(
            "Starting quiz on bank '{}': {} of {} questions (tutor: {}, timer: {})",
            bank.id,
            questions.len(),
            bank.questions.len(),
            options.tutor_mode,
            if options.timer_enabled {
                format!("{}s", options.time_per_question)
            } else {
                "off".to_string()
            }
        );

        self.state = EngineState::Active(ActiveSession::new(bank.id, questions, &options));
        self.last_record = None;
        Ok(())
    }

    pub fn submit_answer(&mut self, option_index: usize) -> Transition {
        self.answer(Some(option_index))
    }

    /// The timed equivalent of submitting nothing.
    pub fn handle_timeout(&mut self) -> Transition {
        match &self.state {
            EngineState::Active(session) if session.countdown.enabled() => self.answer(None),
            _ => Transition::Ignored,
        }
    }

    /// Once-per-second timer callback.
    pub fn tick(&mut self) -> Transition {
        let EngineState::Active(session) = &mut self.state else {
            return Transition::Ignored;
        };
        if session.paused || session.answered || !session.countdown.enabled() {
            return Transition::Ignored;
        }

        if session.countdown.tick() {
            log::debug!("Time ran out on question {}", session.current().id);
            self.handle_timeout()
        } else {
            Transition::Applied
        }
    }

    pub fn navigate(&mut self, direction: Direction) -> Transition {
        let EngineState::Active(session) = &mut self.state else {
            return Transition::Ignored;
        };

        match direction {
            // Review only, and never while a timer is enforced.
            Direction::Prev => {
                if session.countdown.enabled() || !session.retreat() {
                    return Transition::Ignored;
                }
                Transition::Applied
            }
            Direction::Next => {
                if !session.answered {
                    let (question_id, attempt) = session.record(None);
                    self.metrics.record_attempt(question_id, &attempt);
                }
                self.step_forward()
            }
        }
    }

    pub fn toggle_flag(&mut self) -> Transition {
        let EngineState::Active(session) = &mut self.state else {
            return Transition::Ignored;
        };
        let question = session.current_mut();
        question.flagged = !question.flagged;
        Transition::Applied
    }

    pub fn pause(&mut self) -> Transition {
        self.set_paused(true)
    }

    pub fn resume(&mut self) -> Transition {
        self.set_paused(false)
    }

    /// Ends the session early. Every question already shown but left
    /// unanswered is recorded as a non-answer; unreached questions only
    /// appear in the history record.
    pub fn quit(&mut self) -> Transition {
        let EngineState::Active(session) = &mut self.state else {
            return Transition::Ignored;
        };
        for (question_id, attempt) in session.finalize_reached() {
            self.metrics.record_attempt(question_id, &attempt);
        }
        log::info!("Quiz quit at question {}", session.current_index + 1);
        self.complete()
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        match &self.state {
            EngineState::Idle => SessionSnapshot::empty(SessionPhase::Idle),
            EngineState::Completed => {
                let mut snapshot = SessionSnapshot::empty(SessionPhase::Completed);
                if let Some(record) = &self.last_record {
                    snapshot.score = record.score;
                    snapshot.total_questions = record.total_questions;
                }
                snapshot
            }
            EngineState::Active(session) => {
                let question = session.current();
                SessionSnapshot {
                    phase: if session.answered {
                        SessionPhase::Answered
                    } else {
                        SessionPhase::InProgress
                    },
                    current_question: Some(question),
                    current_index: session.current_index,
                    total_questions: session.questions.len(),
                    score: session.score,
                    selected_answer: session.selected_answer,
                    answered: session.answered,
                    flagged: question.flagged,
                    paused: session.paused,
                    show_explanation: session.tutor_mode && session.answered,
                    time_remaining: session.countdown.remaining(),
                }
            }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.snapshot().phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, EngineState::Active(_))
    }

    /// True while the countdown would advance on the next tick.
    pub fn timer_running(&self) -> bool {
        match &self.state {
            EngineState::Active(session) => {
                session.countdown.enabled() && !session.paused && !session.answered
            }
            _ => false,
        }
    }

    pub fn last_record(&self) -> Option<&QuizHistoryRecord> {
        self.last_record.as_ref()
    }

    fn answer(&mut self, selected: Option<usize>) -> Transition {
        let EngineState::Active(session) = &mut self.state else {
            return Transition::Ignored;
        };
        if session.paused || session.answered {
            return Transition::Ignored;
        }

        let (question_id, attempt) = session.record(selected);
        if attempt.is_answered() {
            log::debug!(
                "Question {} answered with {:?} (correct: {})",
                question_id,
                attempt.selected_answer,
                attempt.is_correct
            );
        } else {
            log::debug!("Question {} timed out", question_id);
        }
        self.metrics.record_attempt(question_id, &attempt);

        if session.tutor_mode {
            return Transition::Applied;
        }
        self.step_forward()
    }

    fn step_forward(&mut self) -> Transition {
        let EngineState::Active(session) = &mut self.state else {
            return Transition::Ignored;
        };
        if session.advance() {
            Transition::Applied
        } else {
            self.complete()
        }
    }

    fn complete(&mut self) -> Transition {
        let session = match std::mem::replace(&mut self.state, EngineState::Completed) {
            EngineState::Active(session) => session,
            other => {
                self.state = other;
                return Transition::Ignored;
            }
        };

        let record = session.into_record(Utc::now());
        log::info!(
            "Quiz on bank '{}' completed: {}/{} correct",
            record.bank_id,
            record.score,
            record.total_questions
        );
        self.last_record = Some(record.clone());
        Transition::Completed(record)
    }

    fn set_paused(&mut self, paused: bool) -> Transition {
        match &mut self.state {
            EngineState::Active(session) if session.paused != paused => {
                session.paused = paused;
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }
}
