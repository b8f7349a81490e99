use std::io::Write;

use crate::{app_state::AppState, errors::AppResult};

const RECENT_SESSIONS: usize = 5;

pub async fn show_stats<W: Write>(state: &AppState, bank_id: Option<&str>, out: &mut W) -> AppResult<()> {
    let analytics = &state.analytics_service;

    let overall = analytics.overall_stats(bank_id).await?;
    writeln!(
        out,
        "Sessions: {}  Questions: {}  Answered: {}  Correct: {}  Accuracy: {:.1}%",
        overall.sessions,
        overall.questions,
        overall.answered,
        overall.correct,
        overall.accuracy * 100.0
    )?;

    if let Some(bank_id) = bank_id {
        let usage = analytics.usage(bank_id).await?;
        writeln!(
            out,
            "Bank {}: {} questions, {} used, {} unused, {} last answered wrong, {} flagged, {:.1}% per-question accuracy",
            usage.bank_id,
            usage.total,
            usage.used,
            usage.unused,
            usage.incorrect,
            usage.flagged,
            usage.accuracy * 100.0
        )?;
    }

    let tags = analytics.tag_stats(bank_id).await?;
    if !tags.is_empty() {
        writeln!(out, "\nBy tag:")?;
        for tag in tags {
            writeln!(
                out,
                "  {:<24} {:>4}/{:<4} {:>5.1}%",
                tag.tag,
                tag.correct,
                tag.attempts,
                tag.accuracy * 100.0
            )?;
        }
    }

    let days = analytics.heatmap(bank_id).await?;
    if !days.is_empty() {
        writeln!(out, "\nActivity:")?;
        for day in days {
            writeln!(
                out,
                "  {}  {} sessions, {}/{} correct",
                day.date, day.sessions, day.correct, day.questions
            )?;
        }
    }

    let recent = state.history_service.recent(bank_id, RECENT_SESSIONS).await?;
    if !recent.is_empty() {
        writeln!(out, "\nRecent:")?;
        for record in &recent {
            writeln!(
                out,
                "  {}  {:<16} {}/{}",
                record.end_time.format("%Y-%m-%d %H:%M"),
                record.bank_id,
                record.score,
                record.total_questions
            )?;
        }
    }
    Ok(())
}
