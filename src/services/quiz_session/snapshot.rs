use serde::Serialize;

use crate::models::domain::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    InProgress,
    Answered,
    Completed,
}

/// Read-only view for rendering after every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot<'a> {
    pub phase: SessionPhase,
    pub current_question: Option<&'a Question>,
    pub current_index: usize,
    pub total_questions: usize,
    pub score: usize,
    pub selected_answer: Option<usize>,
    pub answered: bool,
    pub flagged: bool,
    pub paused: bool,
    pub show_explanation: bool,
    pub time_remaining: Option<u32>,
}

impl SessionSnapshot<'_> {
    pub(crate) fn empty(phase: SessionPhase) -> Self {
        SessionSnapshot {
            phase,
            current_question: None,
            current_index: 0,
            total_questions: 0,
            score: 0,
            selected_answer: None,
            answered: false,
            flagged: false,
            paused: false,
            show_explanation: false,
            time_remaining: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::InProgress | SessionPhase::Answered)
    }
}
