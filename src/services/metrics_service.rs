use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    errors::AppResult,
    models::domain::{Attempt, QuestionId},
    repositories::{MetricsRepository, QuestionLibraryRepository},
};

/// Write-only recorder of per-question outcomes. The engine never waits on
/// it and never looks at a result.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsSink: Send + Sync {
    fn record_attempt(&self, question_id: QuestionId, attempt: &Attempt);
}

/// Discards everything.
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record_attempt(&self, _question_id: QuestionId, _attempt: &Attempt) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptEvent {
    pub question_id: QuestionId,
    pub attempt: Attempt,
}

/// Hands events to a `MetricsCommitter` through an unbounded channel.
pub struct ChannelMetricsSink {
    sender: UnboundedSender<AttemptEvent>,
}

impl ChannelMetricsSink {
    pub fn channel() -> (Self, UnboundedReceiver<AttemptEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl MetricsSink for ChannelMetricsSink {
    fn record_attempt(&self, question_id: QuestionId, attempt: &Attempt) {
        let event = AttemptEvent {
            question_id,
            attempt: attempt.clone(),
        };
        if self.sender.send(event).is_err() {
            log::warn!(
                "Metrics committer is gone; dropping attempt for question {}",
                question_id
            );
        }
    }
}

/// Applies sink events to the canonical library and the metrics store.
pub struct MetricsCommitter {
    library: Arc<dyn QuestionLibraryRepository>,
    metrics: Arc<dyn MetricsRepository>,
}

impl MetricsCommitter {
    pub fn new(
        library: Arc<dyn QuestionLibraryRepository>,
        metrics: Arc<dyn MetricsRepository>,
    ) -> Self {
        Self { library, metrics }
    }

    /// The library write comes first so an event for a question the library
    /// no longer holds leaves no metrics behind.
    pub async fn apply(&self, event: AttemptEvent) -> AppResult<()> {
        self.library
            .update_attempt(event.question_id, event.attempt.clone())
            .await?;
        self.metrics
            .record(event.question_id, &event.attempt)
            .await?;
        Ok(())
    }

    /// Runs until every sender is dropped. Failed writes are logged and
    /// skipped. Returns the number of events applied successfully.
    pub async fn run(self, mut receiver: UnboundedReceiver<AttemptEvent>) -> usize {
        let mut applied = 0;
        while let Some(event) = receiver.recv().await {
            let question_id = event.question_id;
            match self.apply(event).await {
                Ok(()) => {
                    applied += 1;
                    log::debug!("Committed attempt for question {}", question_id);
                }
                Err(err) => log::warn!(
                    "Failed to commit attempt for question {}: {}",
                    question_id,
                    err
                ),
            }
        }
        applied
    }
}
