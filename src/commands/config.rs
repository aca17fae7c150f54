//! `fvm config` handlers. None of these need an API key.

use fvm_cli::display::render_config_summary;
use fvm_cli::{ConfigStore, ConfigWriter, FluenceConfig};

use super::Console;
use crate::CliError;
use crate::cli::ConfigCommand;

pub(crate) fn run(console: &Console, command: ConfigCommand) -> Result<(), CliError> {
    run_with(console, &ConfigStore::new(), command)
}

/// Runs `command`, writing templates through `writer`.
pub(crate) fn run_with<W: ConfigWriter>(
    console: &Console,
    writer: &W,
    command: ConfigCommand,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::Init(args) => {
            let path = writer.write_config_template(args.force)?;
            console.success(format!("Configuration template written to {path}"));
            console.status("Set FLUENCE_API_KEY and SSH_PUBLIC_KEY, or run 'fvm config env'.");
            Ok(())
        }
        ConfigCommand::Env(args) => {
            let path = writer.write_env_template(args.force)?;
            console.success(format!("Environment template written to {path}"));
            console.status("Copy it to .env and fill in your secrets.");
            Ok(())
        }
        ConfigCommand::Show => {
            let config = FluenceConfig::load_without_cli_args()?;
            console.result(&render_config_summary(&config.summary(), console.format())?)
        }
    }
}
