pub mod bank_handler;
pub mod quiz_handler;
pub mod stats_handler;

pub use bank_handler::{import_library, list_banks};
pub use quiz_handler::{run_quiz, ConsoleCommand};
pub use stats_handler::show_stats;
