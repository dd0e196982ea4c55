use clap::Parser;
use kodukai::args::{Args, Command};
use kodukai::source::Mode;
use kodukai::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().kodukai_home().path();

    // When KODUKAI_IN_TEST_MODE is set and non-empty the seeded in-memory worksheet is used
    // instead of the CSV export.
    let mode = Mode::from_env();

    match args.command() {
        Command::Init => commands::init(home)?.print(),
        Command::Overview => commands::overview(&Config::load(home)?, mode)?.print(),
        Command::Monthly => commands::monthly(&Config::load(home)?, mode)?.print(),
        Command::Categories(categories_args) => {
            commands::categories(&Config::load(home)?, mode, categories_args.top())?.print()
        }
        Command::Search(search_args) => commands::search(
            &Config::load(home)?,
            mode,
            search_args.query(),
            search_args.case_sensitive(),
        )?
        .print(),
        Command::Daily => commands::daily(&Config::load(home)?, mode)?.print(),
        Command::Weekdays => commands::weekdays(&Config::load(home)?, mode)?.print(),
        Command::Diagnostics => commands::diagnostics(&Config::load(home)?, mode)?.print(),
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
