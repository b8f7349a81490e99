//! Per-question countdown and the one-second interval that drives it.
//!
//! The countdown itself is plain state owned by the session; the interval
//! only decides when `QuizSessionEngine::tick` is called.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::models::domain::QuizHistoryRecord;
use crate::services::quiz_session::{QuizSessionEngine, Transition};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    seconds_per_question: Option<u32>,
    remaining: u32,
}

impl Countdown {
    pub fn new(enabled: bool, seconds_per_question: u32) -> Self {
        if enabled {
            Countdown {
                seconds_per_question: Some(seconds_per_question),
                remaining: seconds_per_question,
            }
        } else {
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Countdown {
            seconds_per_question: None,
            remaining: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.seconds_per_question.is_some()
    }

    pub fn seconds_per_question(&self) -> Option<u32> {
        self.seconds_per_question
    }

    pub fn remaining(&self) -> Option<u32> {
        self.seconds_per_question.map(|_| self.remaining)
    }

    pub fn reset(&mut self) {
        if let Some(seconds) = self.seconds_per_question {
            self.remaining = seconds;
        }
    }

    /// One second elapsed. Returns true when time has just run out.
    pub fn tick(&mut self) -> bool {
        if !self.enabled() || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// First tick fires one period from now, not immediately.
pub fn ticker() -> Interval {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Ticks the engine until the session completes or the countdown can no
/// longer advance on its own (paused, answered in tutor mode, untimed).
pub async fn drive_until_idle(
    engine: &mut QuizSessionEngine,
    interval: &mut Interval,
) -> Option<QuizHistoryRecord> {
    while engine.timer_running() {
        interval.tick().await;
        if let Transition::Completed(record) = engine.tick() {
            return Some(record);
        }
    }
    None
}
