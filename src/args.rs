//! These structs provide the CLI interface for the econostats CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// econostats: builds a monthly-by-payee recurring payments spreadsheet from
/// your bank's transaction exports.
///
/// The program keeps your full transaction history as JSON in a drive folder,
/// merges each new export into it without duplicating already-recorded
/// transactions, and regenerates the spreadsheet from the merged history and
/// your payee filters. Payee filters map substrings of transaction names to
/// spreadsheet columns and can live both in a local file and in the drive
/// folder.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Decide what directory you
    /// want to store data in and pass this as --econostats-home (defaults to
    /// $HOME/econostats), and download your Google OAuth client credentials
    /// file and pass it as --api-key.
    Init(InitArgs),
    /// Verify and refresh the stored OAuth token.
    Auth,
    /// Import a bank export, reconcile it with the stored history and
    /// generate the spreadsheet.
    Generate(GenerateArgs),
    /// Push the local payee filters (and optionally a bank export) to the
    /// drive folder, replacing what is there.
    Upload(UploadArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where econostats data and configuration is held.
    /// Defaults to ~/econostats
    #[arg(long, env = "ECONOSTATS_HOME", default_value_t = default_econostats_home())]
    econostats_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, econostats_home: PathBuf) -> Self {
        Self {
            log_level,
            econostats_home: econostats_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn econostats_home(&self) -> &DisplayPath {
        &self.econostats_home
    }
}

/// Args for the `econostats init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to your downloaded OAuth API credentials. This file will be
    /// copied to the default secrets location in the main data directory.
    #[arg(long)]
    api_key: PathBuf,
}

impl InitArgs {
    pub fn new(api_key: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &Path {
        &self.api_key
    }
}

/// Args for the `econostats generate` command.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// The bank export file to import.
    #[arg(long = "file", short = 'f')]
    file: PathBuf,
}

impl GenerateArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Args for the `econostats upload` command.
#[derive(Debug, Parser, Clone)]
pub struct UploadArgs {
    /// A bank export file whose transactions should replace the persisted
    /// history. When omitted, only the payee filters are uploaded.
    #[arg(long = "file", short = 'f')]
    file: Option<PathBuf>,
}

impl UploadArgs {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

fn default_econostats_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("econostats"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --econostats-home or ECONOSTATS_HOME instead of relying on the \
                default econostats home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("econostats")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
