use clap::Parser;
use econostats::args::{Args, Command};
use econostats::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().econostats_home().path();

    // This allows for testing the program without hitting the Google APIs.
    // When ECONOSTATS_IN_TEST_MODE is set and non-zero in length, the store
    // is served from memory, otherwise it is Google Drive.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_key()).await?.print(),

        Command::Auth => {
            let config = Config::load(home).await?;
            commands::auth(&config).await?.print()
        }

        Command::Generate(generate_args) => {
            let config = Config::load(home).await?;
            commands::generate(&config, mode, generate_args.file())
                .await?
                .print()
        }

        Command::Upload(upload_args) => {
            let config = Config::load(home).await?;
            commands::upload(&config, mode, upload_args.file())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
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
