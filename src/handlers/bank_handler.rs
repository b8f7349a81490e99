use std::io::Write;
use std::path::Path;

use crate::{
    app_state::AppState,
    errors::AppResult,
    models::domain::QuestionLibrary,
    repositories::{QuestionLibraryRepository, QuestionRepository},
};

pub async fn list_banks<W: Write>(state: &AppState, out: &mut W) -> AppResult<()> {
    let banks = state.questions.list_banks().await?;

    if banks.is_empty() {
        writeln!(out, "No question banks yet. Import a library first.")?;
        return Ok(());
    }

    for bank in banks {
        writeln!(out, "{:<20} {:<40} {:>4} questions", bank.id, bank.name, bank.question_count)?;
    }
    Ok(())
}

/// Replaces the library with the file's contents. Questions that already
/// exist keep their attempt history and flag unless the file carries its own.
pub async fn import_library(state: &AppState, path: &Path) -> AppResult<QuestionLibrary> {
    let raw = tokio::fs::read_to_string(path).await?;
    let mut imported: QuestionLibrary = serde_json::from_str(&raw)?;
    let existing = state.questions.load().await?;

    let mut kept = 0;
    for question in &mut imported.questions {
        let Some(previous) = existing.questions.iter().find(|q| q.id == question.id) else {
            continue;
        };
        if question.attempts.is_empty() && !previous.attempts.is_empty() {
            question.attempts = previous.attempts.clone();
            question.flagged = question.flagged || previous.flagged;
            kept += 1;
        }
    }

    state.questions.save(imported.clone()).await?;
    log::info!(
        "Imported {} from {} ({} questions kept their history)",
        imported.questions.len(),
        path.display(),
        kept
    );
    Ok(imported)
}
