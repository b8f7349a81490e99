use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    models::{domain::QuizHistoryRecord, dto::request::StartOptions},
    services::{
        metrics_service::ChannelMetricsSink,
        quiz_session::{Direction, QuizSessionEngine, SessionPhase, SessionSnapshot, Transition},
        timer::ticker,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Zero-based option index.
    Answer(usize),
    Next,
    Prev,
    Flag,
    Pause,
    Resume,
    Quit,
}

impl ConsoleCommand {
    /// Options are numbered from 1 on screen.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if let Ok(number) = input.parse::<usize>() {
            return number.checked_sub(1).map(ConsoleCommand::Answer);
        }

        match input.as_str() {
            "n" | "next" => Some(ConsoleCommand::Next),
            "p" | "prev" => Some(ConsoleCommand::Prev),
            "f" | "flag" => Some(ConsoleCommand::Flag),
            "pause" => Some(ConsoleCommand::Pause),
            "r" | "resume" => Some(ConsoleCommand::Resume),
            "q" | "quit" => Some(ConsoleCommand::Quit),
            _ => None,
        }
    }

    pub fn apply(self, engine: &mut QuizSessionEngine) -> Transition {
        match self {
            ConsoleCommand::Answer(index) => engine.submit_answer(index),
            ConsoleCommand::Next => engine.navigate(Direction::Next),
            ConsoleCommand::Prev => engine.navigate(Direction::Prev),
            ConsoleCommand::Flag => engine.toggle_flag(),
            ConsoleCommand::Pause => engine.pause(),
            ConsoleCommand::Resume => engine.resume(),
            ConsoleCommand::Quit => engine.quit(),
        }
    }
}

/// Runs one quiz on the console until it completes, then commits metrics
/// and saves the history record. End of input quits the session.
pub async fn run_quiz<R, W>(
    state: &AppState,
    options: StartOptions,
    input: R,
    out: &mut W,
) -> AppResult<QuizHistoryRecord>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (sink, receiver) = ChannelMetricsSink::channel();
    let committer = tokio::spawn(state.committer().run(receiver));
    let mut engine = state.engine(Arc::new(sink));

    engine.start(options).await?;
    render(out, &engine.snapshot())?;

    let mut lines = input.lines();
    let mut interval = ticker();
    let mut was_running = engine.timer_running();
    let mut shown_index = engine.snapshot().current_index;

    let record = loop {
        let transition = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => match ConsoleCommand::parse(&line) {
                    Some(command) => command.apply(&mut engine),
                    None => {
                        writeln!(out, "Unknown command '{}'", line.trim())?;
                        continue;
                    }
                },
                None => engine.quit(),
            },
            _ = interval.tick(), if engine.timer_running() => engine.tick(),
        };

        let snapshot = engine.snapshot();
        match transition {
            Transition::Completed(record) => break record,
            Transition::Ignored => writeln!(out, "(not available right now)")?,
            Transition::Applied if snapshot.current_index != shown_index || !was_running => {
                render(out, &snapshot)?
            }
            Transition::Applied => render_status(out, &snapshot)?,
        }

        // A fresh question or a resumed clock gets a full first second.
        let running = engine.timer_running();
        if running && (!was_running || snapshot.current_index != shown_index) {
            interval.reset();
        }
        was_running = running;
        shown_index = snapshot.current_index;
    };

    drop(engine);
    let committed = committer
        .await
        .map_err(|e| AppError::InternalError(format!("Metrics committer failed: {}", e)))?;
    log::debug!("Committed {} attempts", committed);

    let record = state.history_service.finish(record).await?;
    writeln!(
        out,
        "\nFinished: {}/{} correct ({:.0}%) in {}s",
        record.score,
        record.total_questions,
        record.accuracy() * 100.0,
        record.duration_seconds()
    )?;
    Ok(record)
}

fn render<W: Write>(out: &mut W, snapshot: &SessionSnapshot<'_>) -> std::io::Result<()> {
    let Some(question) = snapshot.current_question else {
        if snapshot.phase == SessionPhase::Completed {
            writeln!(out, "Quiz complete.")?;
        }
        return Ok(());
    };

    writeln!(
        out,
        "\nQuestion {}/{}{}",
        snapshot.current_index + 1,
        snapshot.total_questions,
        if snapshot.flagged { " [flagged]" } else { "" }
    )?;
    writeln!(out, "{}", question.question)?;
    for (i, option) in question.options.iter().enumerate() {
        let marker = match (snapshot.answered, snapshot.selected_answer) {
            (true, _) if question.correct_answer == Some(i) => "*",
            (true, Some(selected)) if selected == i => "x",
            _ => " ",
        };
        writeln!(out, " {}{}. {}", marker, i + 1, option)?;
    }
    render_status(out, snapshot)
}

fn render_status<W: Write>(out: &mut W, snapshot: &SessionSnapshot<'_>) -> std::io::Result<()> {
    if snapshot.show_explanation {
        if let Some(explanation) = snapshot.current_question.and_then(|q| q.explanation.as_deref()) {
            writeln!(out, "Explanation: {}", explanation)?;
        }
        writeln!(out, "Press n for the next question.")?;
    }
    if snapshot.paused {
        writeln!(out, "Paused. Type resume to continue.")?;
    }
    match snapshot.time_remaining {
        Some(secs) if !snapshot.answered && (secs <= 5 || secs % 10 == 0) => {
            writeln!(out, "{}s left", secs)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::domain::{BankDefinition, Question, QuestionLibrary};
    use crate::repositories::{HistoryRepository, MetricsRepository, QuestionLibraryRepository};

    async fn state_with_bank(count: u64) -> AppState {
        let state = AppState::in_memory(Config::test_config());
        let questions = (1..=count)
            .map(|id| {
                Question::new(id, &format!("Question {}", id), &["right", "wrong"], 0)
                    .with_explanation("The first option is always right.")
            })
            .collect();
        let ids: Vec<u64> = (1..=count).collect();
        state
            .questions
            .save(QuestionLibrary::new(
                questions,
                vec![BankDefinition::new("bank", "Bank").with_question_ids(&ids)],
            ))
            .await
            .expect("library saves");
        state
    }

    #[test]
    fn parses_console_commands() {
        assert_eq!(ConsoleCommand::parse("1"), Some(ConsoleCommand::Answer(0)));
        assert_eq!(ConsoleCommand::parse(" 3 \n"), Some(ConsoleCommand::Answer(2)));
        assert_eq!(ConsoleCommand::parse("0"), None);
        assert_eq!(ConsoleCommand::parse("N"), Some(ConsoleCommand::Next));
        assert_eq!(ConsoleCommand::parse("prev"), Some(ConsoleCommand::Prev));
        assert_eq!(ConsoleCommand::parse("f"), Some(ConsoleCommand::Flag));
        assert_eq!(ConsoleCommand::parse("pause"), Some(ConsoleCommand::Pause));
        assert_eq!(ConsoleCommand::parse("resume"), Some(ConsoleCommand::Resume));
        assert_eq!(ConsoleCommand::parse("q"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("hello"), None);
    }

    #[tokio::test]
    async fn console_run_saves_history_and_metrics() {
        let state = state_with_bank(3).await;
        let input: &[u8] = b"1\nf\n1\nbogus\n2\n";
        let mut out = Vec::new();

        let record = run_quiz(&state, StartOptions::new("bank", 3), input, &mut out)
            .await
            .expect("quiz runs");

        assert_eq!(record.score, 2);
        assert_eq!(record.question_attempts.len(), 3);
        let history = state.history.find_all().await.expect("history loads");
        assert_eq!(history.len(), 1);
        assert_eq!(state.metrics.find_all().await.expect("metrics").len(), 3);

        let library = state.questions.load().await.expect("library loads");
        let flagged: Vec<u64> = library
            .questions
            .iter()
            .filter(|q| q.flagged)
            .map(|q| q.id)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert!(library.questions.iter().all(|q| q.attempts.len() == 1));

        let output = String::from_utf8(out).expect("utf8");
        assert!(output.contains("Unknown command 'bogus'"));
        assert!(output.contains("Finished: 2/3 correct"));
    }

    #[tokio::test]
    async fn end_of_input_quits_and_pads_the_record() {
        let state = state_with_bank(4).await;
        let input: &[u8] = b"1\n";
        let mut out = Vec::new();

        let record = run_quiz(&state, StartOptions::new("bank", 4).tutor(), input, &mut out)
            .await
            .expect("quiz runs");

        assert_eq!(record.question_attempts.len(), 4);
        assert_eq!(record.score, 1);
        assert!(String::from_utf8(out)
            .expect("utf8")
            .contains("Explanation: The first option is always right."));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_run_times_out_without_input() {
        let state = state_with_bank(2).await;
        let (_writer, reader) = tokio::io::duplex(64);
        let mut out = Vec::new();

        let record = run_quiz(
            &state,
            StartOptions::new("bank", 2).timed(3),
            tokio::io::BufReader::new(reader),
            &mut out,
        )
        .await
        .expect("quiz runs");

        assert_eq!(record.score, 0);
        assert!(record
            .question_attempts
            .iter()
            .all(|a| a.selected_answer.is_none()));
        assert_eq!(state.metrics.find_all().await.expect("metrics").len(), 2);
    }

    #[tokio::test]
    async fn start_errors_are_returned() {
        let state = state_with_bank(2).await;
        let input: &[u8] = b"";
        let mut out = Vec::new();

        let err = run_quiz(&state, StartOptions::new("bank", 5), input, &mut out)
            .await
            .expect_err("not enough questions");

        assert_eq!(
            err,
            AppError::InsufficientQuestions {
                requested: 5,
                available: 2
            }
        );
    }
}
