pub mod attempt;
pub mod bank;
pub mod history;
pub mod library;
pub mod metrics;
pub mod question;
pub use attempt::Attempt;
pub use bank::{BankDefinition, BankSummary, QuestionBank};
pub use history::{AttemptSummary, QuizHistoryRecord};
pub use library::QuestionLibrary;
pub use metrics::QuestionMetrics;
pub use question::{Question, QuestionId};
