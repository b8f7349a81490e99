use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub sessions: usize,
    pub questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPerformance {
    pub tag: String,
    pub attempts: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// One heatmap cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub sessions: usize,
    pub questions: usize,
    pub correct: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankUsage {
    pub bank_id: String,
    pub total: usize,
    pub used: usize,
    pub unused: usize,
    pub incorrect: usize,
    pub flagged: usize,
    /// Mean per-question accuracy over the used questions.
    pub accuracy: f64,
}

pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
