use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::attempt::Attempt;

pub type QuestionId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_answer"))]
pub struct Question {
    pub id: QuestionId,
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub question: String,
    #[validate(length(min = 2, message = "a question needs at least two options"))]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<QuestionMedia>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub attempts: Vec<Attempt>, // append-only
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMedia {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub timing: MediaTiming,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum MediaTiming {
    #[default]
    WithQuestion,
    AfterAnswer,
}

fn validate_correct_answer(question: &Question) -> Result<(), ValidationError> {
    match question.correct_answer {
        Some(index) if index >= question.options.len() => {
            let mut err = ValidationError::new("correct_answer_out_of_range");
            err.message = Some(
                format!(
                    "question {} marks option {} correct but has {} options",
                    question.id,
                    index,
                    question.options.len()
                )
                .into(),
            );
            Err(err)
        }
        _ => Ok(()),
    }
}

impl Question {
    pub fn new(id: QuestionId, question: &str, options: &[&str], correct_answer: usize) -> Self {
        Question {
            id,
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: Some(correct_answer),
            explanation: None,
            media: None,
            tags: Vec::new(),
            flagged: false,
            attempts: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_explanation(mut self, explanation: &str) -> Self {
        self.explanation = Some(explanation.to_string());
        self
    }

    /// A missing selection is never correct, and neither is any selection
    /// when the question has no correct option recorded.
    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        match (selected, self.correct_answer) {
            (Some(selected), Some(correct)) => selected == correct,
            _ => false,
        }
    }

    /// Value copy used inside a quiz session: same content, no prior attempts.
    pub fn session_copy(&self) -> Question {
        Question {
            attempts: Vec::new(),
            ..self.clone()
        }
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(1, "2 + 2?", &["3", "4", "5"], 1).with_tags(&["math"])
    }

    #[test]
    fn is_correct_compares_against_correct_option() {
        let question = sample();

        assert!(question.is_correct(Some(1)));
        assert!(!question.is_correct(Some(0)));
        assert!(!question.is_correct(None));
    }

    #[test]
    fn nothing_is_correct_without_a_correct_answer() {
        let mut question = sample();
        question.correct_answer = None;

        assert!(!question.is_correct(None));
        assert!(!question.is_correct(Some(1)));
    }

    #[test]
    fn session_copy_drops_attempt_history_only() {
        let mut question = sample();
        question.flagged = true;
        question.attempts.push(Attempt::record(&question, Some(1)));

        let copy = question.session_copy();

        assert!(copy.attempts.is_empty());
        assert!(copy.flagged);
        assert_eq!(copy.tags, question.tags);
        assert_eq!(question.attempts.len(), 1);
    }

    #[test]
    fn validation_rejects_out_of_range_correct_answer() {
        let mut question = sample();
        question.correct_answer = Some(3);

        assert!(question.validate().is_err());
    }

    #[test]
    fn validation_rejects_single_option_questions() {
        let question = Question::new(2, "Only one?", &["yes"], 0);

        assert!(question.validate().is_err());
    }

    #[test]
    fn deserializes_web_app_shape_with_defaults() {
        let json = r#"{
            "id": 7,
            "question": "Capital of France?",
            "options": ["Paris", "Rome"],
            "correctAnswer": 0,
            "media": { "type": "image", "url": "paris.png" }
        }"#;

        let question: Question = serde_json::from_str(json).expect("question should parse");

        assert_eq!(question.correct_answer, Some(0));
        assert!(question.tags.is_empty());
        assert!(!question.flagged);
        let media = question.media.expect("media should parse");
        assert_eq!(media.kind, MediaKind::Image);
        assert_eq!(media.timing, MediaTiming::WithQuestion);
    }
}
