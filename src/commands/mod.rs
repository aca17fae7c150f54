//! Command handlers shared plumbing: output, prompts, and API sessions.
//!
//! Results go to stdout; progress, warnings, and confirmations go to stderr
//! so `--format json` output stays machine readable.

pub(crate) mod config;
pub(crate) mod market;
pub(crate) mod ssh_keys;
pub(crate) mod vm;

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use colored::Colorize;
use dialoguer::Confirm;
use tracing::debug;

use fvm_cli::{FluenceClient, FluenceConfig, OutputFormat, WaitOptions};

use crate::CliError;

/// Terminal output for one invocation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Console {
    format: OutputFormat,
}

impl Console {
    pub(crate) const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub(crate) const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether a spinner should be drawn on stderr.
    pub(crate) fn shows_progress(&self) -> bool {
        !self.format.is_json() && io::stderr().is_terminal()
    }

    /// Writes rendered results to stdout.
    pub(crate) fn result(&self, rendered: &str) -> Result<(), CliError> {
        let newline = if rendered.ends_with('\n') { "" } else { "\n" };
        let mut stdout = io::stdout().lock();
        write!(stdout, "{rendered}{newline}")
            .and_then(|()| stdout.flush())
            .map_err(|err| CliError::Output(err.to_string()))
    }

    pub(crate) fn status(&self, message: impl Display) {
        writeln!(io::stderr(), "{message}").ok();
    }

    pub(crate) fn heading(&self, message: impl Display) {
        if !self.format.is_json() {
            writeln!(io::stderr(), "{}", message.to_string().bold()).ok();
        }
    }

    pub(crate) fn success(&self, message: impl Display) {
        writeln!(io::stderr(), "{}", message.to_string().green()).ok();
    }

    pub(crate) fn warn(&self, message: impl Display) {
        writeln!(io::stderr(), "{}", format!("Warning: {message}").yellow()).ok();
    }

    /// Asks for confirmation unless `force` is set.
    pub(crate) fn confirm(&self, prompt: &str, force: bool) -> Result<bool, CliError> {
        if force {
            return Ok(true);
        }
        if !io::stdin().is_terminal() {
            return Err(CliError::Prompt(String::from(
                "confirmation needs an interactive terminal; rerun with --force",
            )));
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_failure)
    }
}

/// Ctrl-C at a prompt surfaces as an interrupted read.
pub(crate) fn prompt_failure(err: dialoguer::Error) -> CliError {
    let dialoguer::Error::IO(source) = err;
    if source.kind() == io::ErrorKind::Interrupted {
        CliError::Interrupted
    } else {
        CliError::Prompt(format!("confirmation failed: {source}"))
    }
}

/// Loaded configuration plus an authenticated client.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) config: FluenceConfig,
    pub(crate) client: FluenceClient,
}

impl Session {
    /// Loads and validates configuration, then builds the API client.
    pub(crate) fn connect() -> Result<Self, CliError> {
        let config = FluenceConfig::load_without_cli_args()?;
        config.validate()?;
        config.require_api_key()?;
        let client = FluenceClient::from_config(&config)?;
        debug!(api_url = %client.base_url(), "connected to marketplace API");
        Ok(Self { config, client })
    }

    /// Wait timing from configuration with optional overrides in seconds.
    pub(crate) fn wait_options(
        &self,
        timeout_secs: Option<u64>,
        interval_secs: Option<u64>,
    ) -> Result<WaitOptions, CliError> {
        let timeout =
            timeout_secs.map_or_else(|| self.config.default_timeout(), Duration::from_secs);
        let interval =
            interval_secs.map_or_else(|| self.config.poll_interval(), Duration::from_secs);
        Ok(WaitOptions::new(timeout, interval)?)
    }
}

/// Reads a local file named on the command line.
pub(crate) fn read_local_file(path: &str) -> Result<String, CliError> {
    let file = Utf8Path::new(path.trim());
    let parent = file
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = file
        .file_name()
        .ok_or_else(|| CliError::Input(format!("{file} does not name a file")))?;
    Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(name))
        .map_err(|err| CliError::Input(format!("failed to read {file}: {err}")))
}

/// Parses a JSON request body read from `path`.
pub(crate) fn read_json_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let contents = read_local_file(path)?;
    serde_json::from_str(&contents)
        .map_err(|err| CliError::Input(format!("invalid JSON in {}: {err}", path.trim())))
}
