//! Binary entry point for the `fvm` CLI.

mod cli;
mod commands;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use fvm_cli::{
    ApiError, ConfigError, ConfigStoreError, DisplayError, OutputFormat, PortError, RequestError,
    SshKeyError, WaitError,
};

use cli::{Cli, Command, FormatArg};
use commands::Console;

const INTERRUPTED_EXIT_CODE: i32 = 130;
const DEBUG_FILTER: &str = "fvm=debug,fvm_cli=debug";
const DEFAULT_FILTER: &str = "warn";

/// Errors surfaced to the user as `Error: <message>` with exit code 1.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Wait(#[from] WaitError),
    #[error(transparent)]
    Ports(#[from] PortError),
    #[error("invalid SSH public key: {0}")]
    SshKey(#[from] SshKeyError),
    #[error(transparent)]
    Store(#[from] ConfigStoreError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error("{0}")]
    Input(String),
    #[error("failed to write output: {0}")]
    Output(String),
    #[error("{0}")]
    Prompt(String),
    #[error("unexpected response from the API: {0}")]
    UnexpectedResponse(String),
    #[error("interrupted")]
    Interrupted,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let exit_code = tokio::select! {
        result = dispatch(cli) => exit_code_for(result),
        _ = tokio::signal::ctrl_c() => exit_code_for(Err(CliError::Interrupted)),
    };

    process::exit(exit_code);
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

const fn output_format(arg: FormatArg) -> OutputFormat {
    match arg {
        FormatArg::Table => OutputFormat::Table,
        FormatArg::Json => OutputFormat::Json,
        FormatArg::Compact => OutputFormat::Compact,
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let console = Console::new(output_format(cli.format));
    match cli.command {
        Command::Vm(command) => commands::vm::run(&console, command).await,
        Command::Market(command) => commands::market::run(&console, command).await,
        Command::SshKey(command) => commands::ssh_keys::run(&console, command).await,
        Command::Config(command) => commands::config::run(&console, command),
    }
}

/// Reports `result` on stderr and returns the process exit code.
fn exit_code_for(result: Result<(), CliError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(CliError::Interrupted) => {
            writeln!(io::stderr(), "\nInterrupted").ok();
            INTERRUPTED_EXIT_CODE
        }
        Err(err) => {
            report_error(&err);
            1
        }
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "Error: {err}").ok();
}

#[cfg(test)]
mod main_tests;
