use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quiz_runner::{
    app_state::AppState,
    config::Config,
    errors::{AppResult, ErrorResponse},
    handlers,
    models::dto::request::{QuestionFilter, StartOptions},
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding the JSON data files.
    #[arg(long, env = "QUIZ_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List question banks.
    Banks,
    /// Take a quiz on the console.
    Run {
        bank_id: String,
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        tutor: bool,
        /// Seconds per question.
        #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "0")]
        timer: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        unused: bool,
        #[arg(long)]
        incorrect: bool,
        #[arg(long)]
        flagged: bool,
    },
    /// Show accuracy, tag and activity stats.
    Stats {
        #[arg(long)]
        bank: Option<String>,
    },
    /// Replace the question library with a JSON file.
    Import { file: PathBuf },
    /// Delete every finished-session record.
    ClearHistory,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(data_dir) = cli.data_dir.clone() {
        config = config.with_data_dir(data_dir);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(err) = run(cli.command, config).await {
        let response = ErrorResponse::from(&err);
        log::debug!("Command failed with {}", response.code);
        eprintln!("error: {}", response.error);
        std::process::exit(if err.is_user_error() { 2 } else { 1 });
    }
}

async fn run(command: Command, config: Config) -> AppResult<()> {
    let default_count = config.default_question_count;
    let default_time = config.default_time_per_question;
    let state = AppState::new(config).await?;
    let mut stdout = std::io::stdout();

    match command {
        Command::Banks => handlers::list_banks(&state, &mut stdout).await,
        Command::Run {
            bank_id,
            count,
            tutor,
            timer,
            seed,
            tags,
            unused,
            incorrect,
            flagged,
        } => {
            let mut options = StartOptions::new(&bank_id, count.unwrap_or(default_count));
            if tutor {
                options = options.tutor();
            }
            if let Some(secs) = timer {
                // bare --timer uses the configured default
                options = options.timed(if secs == 0 { default_time } else { secs });
            }
            if let Some(seed) = seed {
                options = options.with_seed(seed);
            }
            let filter = QuestionFilter {
                tags,
                unused,
                incorrect,
                correct: false,
                flagged,
            };
            if !filter.is_empty() {
                options = options.with_filter(filter);
            }

            let input = tokio::io::BufReader::new(tokio::io::stdin());
            handlers::run_quiz(&state, options, input, &mut stdout)
                .await
                .map(|_| ())
        }
        Command::Stats { bank } => handlers::show_stats(&state, bank.as_deref(), &mut stdout).await,
        Command::Import { file } => {
            let library = handlers::import_library(&state, &file).await?;
            println!(
                "Imported {} questions in {} banks",
                library.questions.len(),
                library.banks.len()
            );
            Ok(())
        }
        Command::ClearHistory => {
            let removed = state.history_service.clear().await?;
            println!("Removed {} history records", removed);
            Ok(())
        }
    }
}
