//! Configuration loading via `ortho-config`.
//!
//! Values merge defaults, the discovered `config.yaml`, and `FLUENCE_*`
//! environment variables. A `.env` file is loaded into the environment first
//! so secrets can live outside the YAML file.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::DEFAULT_API_URL;
use crate::ports::{Port, PortError};
use crate::ssh_key::{SshKeyError, normalise_public_key};

/// Default OS image for new VMs (Ubuntu 22.04 LTS cloud image).
pub const DEFAULT_OS_IMAGE: &str = "https://cloud-images.ubuntu.com/releases/22.04/release/ubuntu-22.04-server-cloudimg-amd64.img";

/// Ports opened on new VMs unless configured otherwise.
pub const DEFAULT_OPEN_PORTS: &str = "22/tcp,80/tcp,443/tcp";

/// Environment variable naming an explicit `.env` file.
pub const DOTENV_PATH_VAR: &str = "DOTENV_PATH";

/// Unprefixed variable accepted when `FLUENCE_SSH_PUBLIC_KEY` is unset.
pub const SSH_KEY_FALLBACK_VAR: &str = "SSH_PUBLIC_KEY";

const CONFIG_FILE_LABEL: &str = "config.yaml";

/// Settings for talking to the marketplace and defaults for new VMs.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "FLUENCE",
    discovery(
        app_name = "fvm",
        env_var = "FVM_CONFIG_PATH",
        config_file_name = "config.yaml",
        dotfile_name = ".fvm.yaml",
        project_file_name = "config.yaml"
    )
)]
pub struct FluenceConfig {
    /// Bearer token for the marketplace API. Required by every API command.
    pub api_key: Option<String>,
    /// Public key installed on new VMs. Required when creating VMs.
    pub ssh_public_key: Option<String>,
    /// Marketplace API base URL.
    #[ortho_config(default = DEFAULT_API_URL.to_owned())]
    pub api_url: String,
    /// Default vCPU count for new VMs.
    #[ortho_config(default = 2)]
    pub cpu_count: u32,
    /// Default memory in gigabytes.
    #[ortho_config(default = 4)]
    pub memory_gb: u32,
    /// Default storage in gigabytes.
    #[ortho_config(default = 25)]
    pub storage_gb: u32,
    /// Default datacenter country code.
    #[ortho_config(default = "US".to_owned())]
    pub region: String,
    /// Prefix for generated VM names.
    #[ortho_config(default = "fvm-".to_owned())]
    pub name_prefix: String,
    /// OS image URL used when no image is given on the command line.
    #[ortho_config(default = DEFAULT_OS_IMAGE.to_owned())]
    pub os_image: String,
    /// Preferred CPU manufacturer, for example `AMD`.
    pub cpu_manufacturer: Option<String>,
    /// Preferred CPU architecture, for example `Zen`.
    pub cpu_architecture: Option<String>,
    /// Preferred storage type, for example `SSD`.
    pub storage_type: Option<String>,
    /// Comma separated ports opened on new VMs (`22/tcp,80/tcp`).
    #[ortho_config(default = DEFAULT_OPEN_PORTS.to_owned())]
    pub open_ports: String,
    /// Seconds to wait for a VM to reach a status.
    #[ortho_config(default = 300)]
    pub default_timeout_secs: u64,
    /// Seconds between status polls.
    #[ortho_config(default = 10)]
    pub poll_interval_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    yaml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, yaml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            yaml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to {CONFIG_FILE_LABEL}",
            self.description, self.env_var, self.yaml_key
        ))
    }
}

const API_KEY: FieldMetadata =
    FieldMetadata::new("Fluence API key", "FLUENCE_API_KEY", "api_key");
const SSH_PUBLIC_KEY: FieldMetadata = FieldMetadata::new(
    "SSH public key",
    "FLUENCE_SSH_PUBLIC_KEY (or SSH_PUBLIC_KEY)",
    "ssh_public_key",
);

impl FluenceConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    fn require_positive(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be greater than zero: check {} or {} in {CONFIG_FILE_LABEL}",
                metadata.description, metadata.env_var, metadata.yaml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. The
    /// `.env` file is applied first, then defaults, configuration files, and
    /// environment variables are merged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] when an existing `.env` file cannot be
    /// read and [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        load_dotenv()?;
        let config = Self::load_from_iter([OsString::from("fvm")])
            .map_err(|err| ConfigError::Parse(err.to_string()))?;
        Ok(config.with_ssh_key_fallback(env::var(SSH_KEY_FALLBACK_VAR).ok()))
    }

    /// Uses `fallback` as the SSH key when none is configured.
    #[must_use]
    pub fn with_ssh_key_fallback(mut self, fallback: Option<String>) -> Self {
        let configured = self
            .ssh_public_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !configured {
            self.ssh_public_key = fallback.filter(|key| !key.trim().is_empty());
        }
        self
    }

    /// Performs semantic validation on the non-secret settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the offending variable and key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("API URL", "FLUENCE_API_URL", "api_url"),
        )?;
        Self::require_field(
            &self.region,
            &FieldMetadata::new("default region", "FLUENCE_REGION", "region"),
        )?;
        Self::require_field(
            &self.os_image,
            &FieldMetadata::new("default OS image", "FLUENCE_OS_IMAGE", "os_image"),
        )?;
        Self::require_positive(
            u64::from(self.cpu_count),
            &FieldMetadata::new("CPU count", "FLUENCE_CPU_COUNT", "cpu_count"),
        )?;
        Self::require_positive(
            u64::from(self.memory_gb),
            &FieldMetadata::new("memory", "FLUENCE_MEMORY_GB", "memory_gb"),
        )?;
        Self::require_positive(
            u64::from(self.storage_gb),
            &FieldMetadata::new("storage", "FLUENCE_STORAGE_GB", "storage_gb"),
        )?;
        Self::require_positive(
            self.default_timeout_secs,
            &FieldMetadata::new(
                "default timeout",
                "FLUENCE_DEFAULT_TIMEOUT_SECS",
                "default_timeout_secs",
            ),
        )?;
        Self::require_positive(
            self.poll_interval_secs,
            &FieldMetadata::new(
                "poll interval",
                "FLUENCE_POLL_INTERVAL_SECS",
                "poll_interval_secs",
            ),
        )?;
        self.open_ports()?;
        Ok(())
    }

    /// Returns the API key or an actionable error when it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no key is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| API_KEY.missing())
    }

    /// Returns the configured SSH key normalised to `<algorithm> <payload>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no key is configured and
    /// [`ConfigError::SshKey`] when the key is not recognised.
    pub fn require_ssh_public_key(&self) -> Result<String, ConfigError> {
        let raw = self
            .ssh_public_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SSH_PUBLIC_KEY.missing())?;
        Ok(normalise_public_key(raw)?)
    }

    /// Parses the configured default ports.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Ports`] when the list is malformed.
    pub fn open_ports(&self) -> Result<Vec<Port>, ConfigError> {
        Ok(Port::parse_list(&self.open_ports)?)
    }

    /// Default time to wait for a status change.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Interval between status polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Effective settings with secrets reduced to set/unset flags.
    #[must_use]
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            api_url: self.api_url.clone(),
            api_key_set: self.require_api_key().is_ok(),
            ssh_key_set: self
                .ssh_public_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty()),
            cpu_count: self.cpu_count,
            memory_gb: self.memory_gb,
            storage_gb: self.storage_gb,
            region: self.region.clone(),
            name_prefix: self.name_prefix.clone(),
            os_image: self.os_image.clone(),
            cpu_manufacturer: self.cpu_manufacturer.clone(),
            cpu_architecture: self.cpu_architecture.clone(),
            storage_type: self.storage_type.clone(),
            open_ports: self
                .open_ports
                .split(',')
                .map(str::trim)
                .filter(|port| !port.is_empty())
                .map(str::to_owned)
                .collect(),
            default_timeout_secs: self.default_timeout_secs,
            poll_interval_secs: self.poll_interval_secs,
        }
    }
}

/// Printable view of the effective configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConfigSummary {
    /// API base URL.
    pub api_url: String,
    /// Whether an API key is available.
    pub api_key_set: bool,
    /// Whether an SSH public key is available.
    pub ssh_key_set: bool,
    /// Default vCPU count.
    pub cpu_count: u32,
    /// Default memory in gigabytes.
    pub memory_gb: u32,
    /// Default storage in gigabytes.
    pub storage_gb: u32,
    /// Default region.
    pub region: String,
    /// Prefix for generated names.
    pub name_prefix: String,
    /// Default OS image.
    pub os_image: String,
    /// Preferred CPU manufacturer.
    pub cpu_manufacturer: Option<String>,
    /// Preferred CPU architecture.
    pub cpu_architecture: Option<String>,
    /// Preferred storage type.
    pub storage_type: Option<String>,
    /// Default open ports as written in configuration.
    pub open_ports: Vec<String>,
    /// Status wait timeout in seconds.
    pub default_timeout_secs: u64,
    /// Status poll interval in seconds.
    pub poll_interval_secs: u64,
}

/// Loads `DOTENV_PATH` when set, otherwise the nearest `.env` file. A missing
/// implicit `.env` is not an error.
///
/// # Errors
///
/// Returns [`ConfigError::Dotenv`] when a file exists but cannot be parsed,
/// or when `DOTENV_PATH` names a missing file.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    if let Some(explicit) = env::var_os(DOTENV_PATH_VAR) {
        let path = PathBuf::from(explicit);
        dotenvy::from_path(&path).map_err(|err| {
            ConfigError::Dotenv(format!("{}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded environment file");
        return Ok(Some(path));
    }

    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded environment file");
            Ok(Some(path))
        }
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("{0}")]
    MissingField(String),
    /// Indicates a field holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Surfaces errors reading a `.env` file.
    #[error("failed to load environment file {0}")]
    Dotenv(String),
    /// The configured SSH key is unusable.
    #[error("invalid SSH public key: {0}")]
    SshKey(#[from] SshKeyError),
    /// The configured port list is malformed.
    #[error("invalid open_ports setting: {0}")]
    Ports(#[from] PortError),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
