//! Unit tests for the `fvm` binary: error reporting, argument parsing, and
//! the configuration commands.

use std::cell::RefCell;
use std::io;

use camino::Utf8PathBuf;
use clap::Parser;
use rstest::rstest;

use super::*;
use crate::cli::{ConfigCommand, ForceArg, MarketCommand, VmCommand};
use fvm_cli::ConfigWriter;

#[test]
fn errors_are_prefixed_for_the_terminal() {
    let mut buffer = Vec::new();
    write_error(&mut buffer, &CliError::Input(String::from("bad input")));
    assert_eq!(String::from_utf8_lossy(&buffer), "Error: bad input\n");
}

#[test]
fn config_errors_keep_their_message() {
    let err = CliError::from(ConfigError::MissingField(String::from(
        "missing api_key (set FLUENCE_API_KEY)",
    )));
    assert_eq!(err.to_string(), "missing api_key (set FLUENCE_API_KEY)");
}

#[rstest]
#[case(Ok(()), 0)]
#[case(Err(CliError::Input(String::from("bad input"))), 1)]
#[case(Err(CliError::Interrupted), INTERRUPTED_EXIT_CODE)]
fn results_map_to_exit_codes(#[case] result: Result<(), CliError>, #[case] expected: i32) {
    assert_eq!(exit_code_for(result), expected);
}

#[test]
fn ctrl_c_at_a_prompt_is_an_interrupt() {
    let err = commands::prompt_failure(dialoguer::Error::IO(io::Error::from(
        io::ErrorKind::Interrupted,
    )));
    assert!(matches!(err, CliError::Interrupted), "unexpected error: {err}");
}

#[test]
fn other_prompt_failures_are_reported() {
    let err = commands::prompt_failure(dialoguer::Error::IO(io::Error::from(
        io::ErrorKind::BrokenPipe,
    )));
    assert!(matches!(err, CliError::Prompt(_)), "unexpected error: {err}");
    assert!(err.to_string().starts_with("confirmation failed"));
}

#[rstest]
#[case(FormatArg::Table, OutputFormat::Table)]
#[case(FormatArg::Json, OutputFormat::Json)]
#[case(FormatArg::Compact, OutputFormat::Compact)]
fn format_flags_map_to_output_formats(#[case] arg: FormatArg, #[case] expected: OutputFormat) {
    assert_eq!(output_format(arg), expected);
}

#[test]
fn format_flag_is_global() {
    let cli = Cli::try_parse_from(["fvm", "vm", "list", "--all", "-f", "json"])
        .unwrap_or_else(|err| panic!("parse: {err}"));
    assert_eq!(cli.format, FormatArg::Json);
    assert!(matches!(
        cli.command,
        Command::Vm(VmCommand::List(ref args)) if args.all && !args.full_id
    ));
}

#[test]
fn update_collects_repeated_port_flags() {
    let cli = Cli::try_parse_from([
        "fvm",
        "vm",
        "update",
        "0xabc",
        "--add-port",
        "80",
        "--add-port",
        "443/tcp",
        "--remove-port",
        "22",
    ])
    .unwrap_or_else(|err| panic!("parse: {err}"));
    let Command::Vm(VmCommand::Update(args)) = cli.command else {
        panic!("expected vm update");
    };
    assert_eq!(args.add_ports, ["80", "443/tcp"]);
    assert_eq!(args.remove_ports, ["22"]);
    assert!(!args.force);
}

#[test]
fn wait_defaults_to_active() {
    let cli = Cli::try_parse_from(["fvm", "vm", "wait", "0xabc"])
        .unwrap_or_else(|err| panic!("parse: {err}"));
    let Command::Vm(VmCommand::Wait(args)) = cli.command else {
        panic!("expected vm wait");
    };
    assert_eq!(args.status, "Active");
    assert_eq!(args.timeout, None);
}

#[test]
fn offers_cpu_requires_memory() {
    let result = Cli::try_parse_from(["fvm", "market", "offers", "--cpu", "2"]);
    assert!(result.is_err());
}

#[test]
fn offers_accept_a_full_shape() {
    let cli = Cli::try_parse_from(["fvm", "market", "offers", "--cpu", "2", "--memory", "4"])
        .unwrap_or_else(|err| panic!("parse: {err}"));
    assert!(matches!(
        cli.command,
        Command::Market(MarketCommand::Offers(ref args))
            if args.cpu == Some(2) && args.memory == Some(4)
    ));
}

#[test]
fn key_and_key_file_conflict() {
    let result = Cli::try_parse_from([
        "fvm",
        "ssh-key",
        "add",
        "--name",
        "laptop",
        "--key",
        "ssh-ed25519 AAAA",
        "--key-file",
        "id.pub",
    ]);
    assert!(result.is_err());
}

/// Records template writes instead of touching the filesystem.
#[derive(Default)]
struct RecordingWriter {
    calls: RefCell<Vec<(&'static str, bool)>>,
    refuse: bool,
}

impl RecordingWriter {
    fn outcome(&self, kind: &'static str, force: bool) -> Result<Utf8PathBuf, ConfigStoreError> {
        self.calls.borrow_mut().push((kind, force));
        let path = Utf8PathBuf::from(kind);
        if self.refuse && !force {
            return Err(ConfigStoreError::AlreadyExists { path });
        }
        Ok(path)
    }
}

impl ConfigWriter for RecordingWriter {
    fn write_config_template(&self, force: bool) -> Result<Utf8PathBuf, ConfigStoreError> {
        self.outcome("config.yaml", force)
    }

    fn write_env_template(&self, force: bool) -> Result<Utf8PathBuf, ConfigStoreError> {
        self.outcome(".env.example", force)
    }
}

#[rstest]
#[case(ConfigCommand::Init(ForceArg { force: false }), ("config.yaml", false))]
#[case(ConfigCommand::Init(ForceArg { force: true }), ("config.yaml", true))]
#[case(ConfigCommand::Env(ForceArg { force: false }), (".env.example", false))]
fn config_templates_go_through_the_writer(
    #[case] command: ConfigCommand,
    #[case] expected: (&'static str, bool),
) {
    let writer = RecordingWriter::default();
    commands::config::run_with(&Console::new(OutputFormat::Table), &writer, command)
        .unwrap_or_else(|err| panic!("config command: {err}"));
    assert_eq!(writer.calls.into_inner(), [expected]);
}

#[test]
fn existing_templates_need_force() {
    let writer = RecordingWriter {
        refuse: true,
        ..RecordingWriter::default()
    };
    let err = commands::config::run_with(
        &Console::new(OutputFormat::Table),
        &writer,
        ConfigCommand::Init(ForceArg { force: false }),
    )
    .err()
    .unwrap_or_else(|| panic!("existing file should be refused"));
    assert!(
        err.to_string().contains("--force"),
        "unexpected error: {err}"
    );
}
