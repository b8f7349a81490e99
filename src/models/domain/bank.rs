use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::question::{Question, QuestionId};

/// A bank as stored in the library: explicit members plus tag membership.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BankDefinition {
    #[validate(length(min = 1, message = "bank id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub question_ids: Vec<QuestionId>,
}

/// A bank resolved against the library, ready for quiz selection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl BankDefinition {
    pub fn new(id: &str, name: &str) -> Self {
        BankDefinition {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            tags: Vec::new(),
            question_ids: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_question_ids(mut self, ids: &[QuestionId]) -> Self {
        self.question_ids = ids.to_vec();
        self
    }

    pub fn contains(&self, question: &Question) -> bool {
        self.question_ids.contains(&question.id)
            || question.tags.iter().any(|tag| self.tags.contains(tag))
    }

    /// Library order is preserved; a question matching both by id and by
    /// tag appears once.
    pub fn resolve(&self, questions: &[Question]) -> QuestionBank {
        let mut seen = HashSet::new();
        let members = questions
            .iter()
            .filter(|q| self.contains(q) && seen.insert(q.id))
            .cloned()
            .collect();

        QuestionBank {
            id: self.id.clone(),
            name: self.name.clone(),
            tags: self.tags.clone(),
            questions: members,
        }
    }
}

impl QuestionBank {
    pub fn summary(&self) -> BankSummary {
        BankSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            question_count: self.questions.len(),
        }
    }
}
