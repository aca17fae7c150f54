//! Command-line interface definitions for the `fvm` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page. It
//! must therefore depend on nothing but `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI for the `fvm` binary.
#[derive(Debug, Parser)]
#[command(
    name = "fvm",
    version,
    about = "Manage virtual machines on the Fluence marketplace",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Output format for results.
    #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Table, global = true)]
    pub(crate) format: FormatArg,
    /// Log API requests and responses to stderr.
    #[arg(long, global = true)]
    pub(crate) debug: bool,
    /// Command group to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Output formats accepted by `--format`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum FormatArg {
    /// Human readable tables.
    #[default]
    Table,
    /// Pretty printed JSON on stdout.
    Json,
    /// One line per record.
    Compact,
}

/// Command groups.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create, inspect, and manage VMs.
    #[command(subcommand)]
    Vm(VmCommand),
    /// Browse marketplace offers and pricing.
    #[command(subcommand)]
    Market(MarketCommand),
    /// Manage SSH keys registered with the account.
    #[command(name = "ssh-key", subcommand)]
    SshKey(SshKeyCommand),
    /// Write configuration templates and show effective settings.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// `fvm vm` subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum VmCommand {
    /// List VMs, showing only active ones by default.
    List(ListArgs),
    /// Show one VM.
    Get(VmIdArg),
    /// Create a VM.
    Create(CreateArgs),
    /// Estimate the price of a VM without creating it.
    Estimate(EstimateArgs),
    /// List the default OS images.
    Images,
    /// Terminate a VM.
    Delete(DeleteArgs),
    /// Rename a VM or change its open ports.
    Update(UpdateArgs),
    /// Change a VM's CPU and memory.
    Scale(ScaleArgs),
    /// Wait until a VM reports a status.
    Wait(WaitArgs),
}

/// Arguments for `fvm vm list`.
#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Show VMs in every status.
    #[arg(long)]
    pub(crate) all: bool,
    /// Show only VMs with this status.
    #[arg(long, value_name = "STATUS")]
    pub(crate) status: Option<String>,
    /// Print complete VM IDs instead of shortened ones.
    #[arg(long)]
    pub(crate) full_id: bool,
}

/// A single VM ID.
#[derive(Debug, Args)]
pub(crate) struct VmIdArg {
    /// VM identifier.
    #[arg(value_name = "ID")]
    pub(crate) vm_id: String,
}

/// Shape and placement flags shared by create, estimate, and pricing.
#[derive(Debug, Args)]
pub(crate) struct ShapeArgs {
    /// Number of vCPUs.
    #[arg(long, value_name = "N")]
    pub(crate) cpu: Option<u32>,
    /// Memory in gigabytes.
    #[arg(long, value_name = "GB")]
    pub(crate) memory: Option<u32>,
    /// Storage in gigabytes.
    #[arg(long, value_name = "GB")]
    pub(crate) storage: Option<u32>,
    /// Datacenter country code.
    #[arg(long, value_name = "CC")]
    pub(crate) region: Option<String>,
}

/// Arguments for `fvm vm create`.
#[derive(Debug, Args)]
pub(crate) struct CreateArgs {
    /// VM name; a name is generated from the configured prefix when omitted.
    #[arg(value_name = "NAME")]
    pub(crate) name: Option<String>,
    /// Shape and placement.
    #[command(flatten)]
    pub(crate) shape: ShapeArgs,
    /// OS image slug from `fvm vm images`, or an image URL.
    #[arg(long, value_name = "SLUG|URL")]
    pub(crate) image: Option<String>,
    /// JSON file holding a complete create request; other flags are ignored.
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<String>,
    /// Wait for the VM to become active.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Seconds to wait when `--wait` is given.
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
}

/// Arguments for `fvm vm estimate`.
#[derive(Debug, Args)]
pub(crate) struct EstimateArgs {
    /// Shape and placement.
    #[command(flatten)]
    pub(crate) shape: ShapeArgs,
    /// JSON file holding a complete estimate request; other flags are ignored.
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<String>,
}

/// Arguments for `fvm vm delete`.
#[derive(Debug, Args)]
pub(crate) struct DeleteArgs {
    /// VM identifier.
    #[arg(value_name = "ID")]
    pub(crate) vm_id: String,
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub(crate) force: bool,
}

/// Arguments for `fvm vm update`.
#[derive(Debug, Args)]
pub(crate) struct UpdateArgs {
    /// VM identifier.
    #[arg(value_name = "ID")]
    pub(crate) vm_id: String,
    /// New VM name.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: Option<String>,
    /// Port to open, as `PORT[/PROTOCOL]`; may be repeated.
    #[arg(long = "add-port", value_name = "PORT")]
    pub(crate) add_ports: Vec<String>,
    /// Port to close, as `PORT[/PROTOCOL]`; may be repeated.
    #[arg(long = "remove-port", value_name = "PORT")]
    pub(crate) remove_ports: Vec<String>,
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub(crate) force: bool,
}

/// Arguments for `fvm vm scale`.
#[derive(Debug, Args)]
pub(crate) struct ScaleArgs {
    /// VM identifier.
    #[arg(value_name = "ID")]
    pub(crate) vm_id: String,
    /// Target number of vCPUs.
    #[arg(long, value_name = "N")]
    pub(crate) cpu: u32,
    /// Target memory in gigabytes.
    #[arg(long, value_name = "GB")]
    pub(crate) memory: u32,
    /// Preferred CPU manufacturer.
    #[arg(long, value_name = "NAME")]
    pub(crate) cpu_manufacturer: Option<String>,
    /// Preferred CPU architecture.
    #[arg(long, value_name = "NAME")]
    pub(crate) cpu_architecture: Option<String>,
    /// Wait for the VM to become active again.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Seconds to wait when `--wait` is given.
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
}

/// Arguments for `fvm vm wait`.
#[derive(Debug, Args)]
pub(crate) struct WaitArgs {
    /// VM identifier.
    #[arg(value_name = "ID")]
    pub(crate) vm_id: String,
    /// Status to wait for.
    #[arg(long, value_name = "STATUS", default_value = "Active")]
    pub(crate) status: String,
    /// Seconds to wait before giving up.
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
    /// Seconds between polls.
    #[arg(long, value_name = "SECS")]
    pub(crate) interval: Option<u64>,
}

/// `fvm market` subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum MarketCommand {
    /// List datacenter country codes.
    Countries,
    /// Price a configuration.
    Pricing(PricingArgs),
    /// List available CPU, memory, and storage options.
    Hardware,
    /// List offers, optionally limited to a shape and region.
    Offers(OffersArgs),
    /// List the standard basic configurations.
    Configurations,
}

/// Arguments for `fvm market pricing`.
#[derive(Debug, Args)]
pub(crate) struct PricingArgs {
    /// Number of vCPUs.
    #[arg(long, value_name = "N")]
    pub(crate) cpu: u32,
    /// Memory in gigabytes.
    #[arg(long, value_name = "GB")]
    pub(crate) memory: u32,
    /// Storage in gigabytes.
    #[arg(long, value_name = "GB")]
    pub(crate) storage: Option<u32>,
    /// Datacenter country code.
    #[arg(long, value_name = "CC")]
    pub(crate) region: Option<String>,
}

/// Arguments for `fvm market offers`.
#[derive(Debug, Args)]
pub(crate) struct OffersArgs {
    /// Number of vCPUs; requires `--memory`.
    #[arg(long, value_name = "N", requires = "memory")]
    pub(crate) cpu: Option<u32>,
    /// Memory in gigabytes; requires `--cpu`.
    #[arg(long, value_name = "GB", requires = "cpu")]
    pub(crate) memory: Option<u32>,
    /// Storage in gigabytes.
    #[arg(long, value_name = "GB")]
    pub(crate) storage: Option<u32>,
    /// Datacenter country code.
    #[arg(long, value_name = "CC")]
    pub(crate) region: Option<String>,
}

/// `fvm ssh-key` subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum SshKeyCommand {
    /// List registered SSH keys.
    List,
    /// Register an SSH public key.
    Add(AddKeyArgs),
    /// Remove an SSH key by fingerprint.
    Remove(RemoveKeyArgs),
}

/// Arguments for `fvm ssh-key add`.
#[derive(Debug, Args)]
pub(crate) struct AddKeyArgs {
    /// Name shown in the key list.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: String,
    /// Public key text; defaults to the configured SSH public key.
    #[arg(long, value_name = "KEY", conflicts_with = "key_file")]
    pub(crate) key: Option<String>,
    /// File holding the public key, for example `~/.ssh/id_ed25519.pub`.
    #[arg(long, value_name = "PATH", conflicts_with = "key")]
    pub(crate) key_file: Option<String>,
}

/// Arguments for `fvm ssh-key remove`.
#[derive(Debug, Args)]
pub(crate) struct RemoveKeyArgs {
    /// Fingerprint of the key to remove.
    #[arg(value_name = "FINGERPRINT")]
    pub(crate) fingerprint: String,
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub(crate) force: bool,
}

/// `fvm config` subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum ConfigCommand {
    /// Write a commented `config.yaml` with the default settings.
    Init(ForceArg),
    /// Write `.env.example` listing the secret variables.
    Env(ForceArg),
    /// Show the effective settings with secrets hidden.
    Show,
}

/// `--force` flag for template writers.
#[derive(Debug, Args)]
pub(crate) struct ForceArg {
    /// Replace an existing file.
    #[arg(long)]
    pub(crate) force: bool,
}
