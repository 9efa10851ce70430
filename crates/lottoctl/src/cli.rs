use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, Table};
use const_format::concatcp;
use eyre::{Report as EyreReport, Result};
use lottosync_store::StoreError;
use serde::{Serialize, Serializer};
use thiserror::Error as ThisError;

use crate::defaults;
use crate::output::{Format, Output, Report};

mod init;
mod peek;
mod pick;
mod status;
mod sync;

use init::InitCommand;
use peek::PeekCommand;
use pick::PickCommand;
use status::StatusCommand;
use sync::SyncCommand;

pub const EXAMPLES: &str = r"
  # Prepare a home directory with a default config and empty history
  $ lottoctl init

  # Pull every round drawn since the last run
  $ lottoctl sync

  # Show the state of the local mirrors
  $ lottoctl status
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  LOTTOSYNC_HOME    Directory for config and data\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Init(InitCommand),
    Sync(SyncCommand),
    Status(StatusCommand),
    Peek(PeekCommand),
    Pick(PickCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Directory for config and data
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_home_dir())]
    #[arg(env = "LOTTOSYNC_HOME", hide_env_values = true)]
    pub home: Utf8PathBuf,

    #[arg(long, value_name = "FORMAT", default_value_t, value_enum)]
    pub output_format: Format,
}

#[derive(Debug)]
pub struct Environment {
    pub home: Utf8PathBuf,
    pub output: Output,
}

impl Environment {
    pub const fn new(home: Utf8PathBuf, output: Output) -> Self {
        Self { home, output }
    }
}

impl RootCommand {
    pub async fn run(self) -> Result<(), CliError> {
        let output = Output::new(self.args.output_format);
        let environment = Environment::new(self.args.home, output);

        let result = match self.action {
            SubCommands::Init(init) => init.run(&environment),
            SubCommands::Sync(sync) => sync.run(&environment).await,
            SubCommands::Status(status) => status.run(&environment),
            SubCommands::Peek(peek) => peek.run(&environment).await,
            SubCommands::Pick(pick) => pick.run(&environment),
        };

        if let Err(err) = result {
            let err = match err.downcast::<StoreError>() {
                Ok(err) => CliError::Store(err),
                Err(err) => CliError::Other(err),
            };

            environment.output.write(&err);
            return Err(err);
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Store(
        #[from]
        #[serde(serialize_with = "serialize_to_string")]
        StoreError,
    ),

    #[error(transparent)]
    Other(
        #[from]
        #[serde(serialize_with = "serialize_eyre_report")]
        EyreReport,
    ),
}

impl From<CliError> for ExitCode {
    fn from(error: CliError) -> Self {
        match error {
            CliError::Store(_) => Self::from(101),
            CliError::Other(_) => Self::FAILURE,
        }
    }
}

impl Report for CliError {
    fn report(&self) {
        let mut table = Table::new();
        let _ = table.set_header(vec![Cell::new("ERROR").fg(Color::Red)]);
        let _ = table.add_row(vec![match self {
            CliError::Store(e) => format!("Store error: {e}"),
            CliError::Other(e) => format!("Error: {e:?}"),
        }]);
        println!("{table}");
    }
}

fn serialize_to_string<S, E>(error: &E, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    E: std::error::Error,
{
    serializer.serialize_str(&error.to_string())
}

fn serialize_eyre_report<S>(report: &EyreReport, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{report:?}"))
}
