use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{QuestionBank, QuestionId, QuestionMetrics, QuizHistoryRecord},
        dto::response::{ratio, BankUsage, DailyActivity, OverallStats, TagPerformance},
    },
    repositories::{HistoryRepository, MetricsRepository, QuestionRepository},
};

pub struct AnalyticsService {
    history: Arc<dyn HistoryRepository>,
    questions: Arc<dyn QuestionRepository>,
    metrics: Arc<dyn MetricsRepository>,
}

impl AnalyticsService {
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        questions: Arc<dyn QuestionRepository>,
        metrics: Arc<dyn MetricsRepository>,
    ) -> Self {
        Self {
            history,
            questions,
            metrics,
        }
    }

    pub async fn overall_stats(&self, bank_id: Option<&str>) -> AppResult<OverallStats> {
        Ok(Self::overall(&self.records(bank_id).await?))
    }

    pub async fn tag_stats(&self, bank_id: Option<&str>) -> AppResult<Vec<TagPerformance>> {
        Ok(Self::tag_performance(&self.records(bank_id).await?))
    }

    pub async fn heatmap(&self, bank_id: Option<&str>) -> AppResult<Vec<DailyActivity>> {
        Ok(Self::daily_heatmap(&self.records(bank_id).await?))
    }

    pub async fn usage(&self, bank_id: &str) -> AppResult<BankUsage> {
        let bank = self
            .questions
            .find_bank(bank_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question bank '{}' not found", bank_id)))?;
        let metrics = self.metrics.find_all().await?;
        Ok(Self::bank_usage(&bank, &metrics))
    }

    async fn records(&self, bank_id: Option<&str>) -> AppResult<Vec<QuizHistoryRecord>> {
        match bank_id {
            Some(id) => self.history.list_by_bank(id).await,
            None => self.history.find_all().await,
        }
    }

    pub fn overall(records: &[QuizHistoryRecord]) -> OverallStats {
        let questions: usize = records.iter().map(|r| r.total_questions).sum();
        let answered: usize = records.iter().map(QuizHistoryRecord::answered_count).sum();
        let correct: usize = records.iter().map(QuizHistoryRecord::correct_count).sum();

        OverallStats {
            sessions: records.len(),
            questions,
            answered,
            correct,
            accuracy: ratio(correct, questions),
        }
    }

    /// Every summary counts once for each of its tags.
    pub fn tag_performance(records: &[QuizHistoryRecord]) -> Vec<TagPerformance> {
        let mut by_tag: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for summary in records.iter().flat_map(|r| &r.question_attempts) {
            for tag in &summary.tags {
                let entry = by_tag.entry(tag.as_str()).or_default();
                entry.0 += 1;
                if summary.is_correct {
                    entry.1 += 1;
                }
            }
        }

        by_tag
            .into_iter()
            .map(|(tag, (attempts, correct))| TagPerformance {
                tag: tag.to_string(),
                attempts,
                correct,
                accuracy: ratio(correct, attempts),
            })
            .collect()
    }

    /// Buckets by the UTC date each session ended, oldest first.
    pub fn daily_heatmap(records: &[QuizHistoryRecord]) -> Vec<DailyActivity> {
        let mut by_day: BTreeMap<NaiveDate, DailyActivity> = BTreeMap::new();
        for record in records {
            let date = record.end_time.date_naive();
            let cell = by_day.entry(date).or_insert_with(|| DailyActivity {
                date,
                sessions: 0,
                questions: 0,
                correct: 0,
            });
            cell.sessions += 1;
            cell.questions += record.total_questions;
            cell.correct += record.correct_count();
        }
        by_day.into_values().collect()
    }

    pub fn bank_usage(
        bank: &QuestionBank,
        metrics: &BTreeMap<QuestionId, QuestionMetrics>,
    ) -> BankUsage {
        let mut usage = BankUsage {
            bank_id: bank.id.clone(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        let mut accuracy_sum = 0.0;

        for question in bank.questions.iter().filter(|q| seen.insert(q.id)) {
            usage.total += 1;
            let entry = metrics.get(&question.id).filter(|m| m.is_used());
            match entry {
                Some(m) => {
                    usage.used += 1;
                    accuracy_sum += m.accuracy();
                    if m.last_correct == Some(false) {
                        usage.incorrect += 1;
                    }
                }
                None => usage.unused += 1,
            }
            if question.flagged {
                usage.flagged += 1;
            }
        }
        if usage.used > 0 {
            usage.accuracy = accuracy_sum / usage.used as f64;
        }
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Attempt, AttemptSummary, Question};
    use chrono::{TimeZone, Utc};

    fn summary(question_id: u64, selected: Option<usize>, correct: bool, tags: &[&str]) -> AttemptSummary {
        AttemptSummary {
            question_id,
            selected_answer: selected,
            is_correct: correct,
            flagged: false,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn record(id: &str, day: u32, hour: u32, attempts: Vec<AttemptSummary>) -> QuizHistoryRecord {
        let end_time = Utc
            .with_ymd_and_hms(2026, 3, day, hour, 0, 0)
            .single()
            .expect("valid timestamp");
        QuizHistoryRecord {
            id: id.to_string(),
            start_time: end_time,
            end_time,
            score: attempts.iter().filter(|a| a.is_correct).count(),
            total_questions: attempts.len(),
            bank_id: "bank".to_string(),
            question_attempts: attempts,
            tutor_mode: false,
            timer_enabled: false,
            time_per_question: None,
        }
    }

    fn records() -> Vec<QuizHistoryRecord> {
        vec![
            record(
                "a",
                1,
                9,
                vec![
                    summary(1, Some(0), true, &["math"]),
                    summary(2, Some(1), false, &["math", "algebra"]),
                ],
            ),
            record(
                "b",
                1,
                23,
                vec![
                    summary(3, Some(0), true, &["history"]),
                    summary(4, None, false, &["history"]),
                ],
            ),
            record("c", 3, 12, vec![summary(1, Some(0), true, &["math"])]),
        ]
    }

    #[test]
    fn overall_counts_every_session() {
        let stats = AnalyticsService::overall(&records());

        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.questions, 5);
        assert_eq!(stats.answered, 4);
        assert_eq!(stats.correct, 3);
        assert!((stats.accuracy - 0.6).abs() < 1e-9);
    }

    #[test]
    fn overall_of_nothing_is_zero() {
        assert_eq!(AnalyticsService::overall(&[]), OverallStats::default());
    }

    #[test]
    fn tag_performance_is_sorted_by_tag() {
        let tags = AnalyticsService::tag_performance(&records());

        let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, vec!["algebra", "history", "math"]);

        let math = &tags[2];
        assert_eq!((math.attempts, math.correct), (3, 2));
        assert_eq!(tags[0].accuracy, 0.0);
    }

    #[test]
    fn heatmap_groups_by_utc_day() {
        let days = AnalyticsService::daily_heatmap(&records());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"));
        assert_eq!(days[0].sessions, 2);
        assert_eq!(days[0].questions, 4);
        assert_eq!(days[0].correct, 2);
        assert_eq!(days[1].sessions, 1);
    }

    #[test]
    fn bank_usage_counts_flags_independently_of_answers() {
        let mut questions: Vec<Question> = (1..=4).map(|id| Question::new(id, "q", &["a", "b"], 0)).collect();
        questions[1].flagged = true;
        questions[3].flagged = true;
        let bank = QuestionBank {
            id: "bank".to_string(),
            name: "Bank".to_string(),
            tags: vec![],
            questions,
        };

        let mut metrics = BTreeMap::new();
        let mut right = QuestionMetrics::new(1);
        right.record(&Attempt::record(&bank.questions[0], Some(0)));
        let mut wrong = QuestionMetrics::new(2);
        wrong.record(&Attempt::record(&bank.questions[1], Some(1)));
        metrics.insert(1, right);
        metrics.insert(2, wrong);
        metrics.insert(3, QuestionMetrics::new(3));

        let usage = AnalyticsService::bank_usage(&bank, &metrics);

        assert_eq!(usage.total, 4);
        assert_eq!(usage.used, 2);
        assert_eq!(usage.unused, 2);
        assert_eq!(usage.incorrect, 1);
        // One flagged question is used, the other is not.
        assert_eq!(usage.flagged, 2);
        assert!((usage.accuracy - 0.5).abs() < 1e-9);
    }
}
