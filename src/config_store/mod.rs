//! Writes the starter `config.yaml` and `.env.example` files.
//!
//! The configuration file target follows `OrthoConfig`'s discovery order: the
//! first existing candidate is reused, otherwise the project file in the
//! working directory is created.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use ortho_config::ConfigDiscovery;
use thiserror::Error;

use crate::api::DEFAULT_API_URL;
use crate::config::{DEFAULT_OPEN_PORTS, DEFAULT_OS_IMAGE};

const APP_NAME: &str = "fvm";
const CONFIG_ENV_VAR: &str = "FVM_CONFIG_PATH";
const CONFIG_FILE_NAME: &str = "config.yaml";
const DOTFILE_NAME: &str = ".fvm.yaml";
const PROJECT_FILE_NAME: &str = "config.yaml";
const ENV_TEMPLATE_NAME: &str = ".env.example";

/// Errors raised while writing configuration templates.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// Raised when no configuration candidates are available.
    #[error("no configuration file candidates were discovered")]
    NoCandidates,
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a path cannot hold a file.
    #[error("invalid configuration path {path}: {message}")]
    InvalidStructure {
        /// Offending path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the target exists and overwrite is disabled.
    #[error("{path} already exists; rerun with --force to replace it")]
    AlreadyExists {
        /// File that would have been replaced.
        path: Utf8PathBuf,
    },
}

/// Abstraction over template writers so commands can be tested without
/// touching the real configuration directories.
pub trait ConfigWriter {
    /// Writes the commented `config.yaml` template.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::AlreadyExists`] when a configuration file
    /// exists and `force` is false, or another [`ConfigStoreError`] when the
    /// file cannot be written.
    fn write_config_template(&self, force: bool) -> Result<Utf8PathBuf, ConfigStoreError>;

    /// Writes `.env.example` listing the secret variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] as for [`Self::write_config_template`].
    fn write_env_template(&self, force: bool) -> Result<Utf8PathBuf, ConfigStoreError>;
}

/// Writes templates using `OrthoConfig`'s discovery search order.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    discovery: ConfigDiscovery,
    env_dir: Utf8PathBuf,
}

impl ConfigStore {
    /// Builds a store using the standard discovery settings, placing
    /// `.env.example` in the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            discovery: ConfigDiscovery::builder(APP_NAME)
                .env_var(CONFIG_ENV_VAR)
                .config_file_name(CONFIG_FILE_NAME)
                .dotfile_name(DOTFILE_NAME)
                .project_file_name(PROJECT_FILE_NAME)
                .build(),
            env_dir: Utf8PathBuf::from("."),
        }
    }

    /// Builds a store using an explicit discovery configuration.
    #[must_use]
    pub fn with_discovery(discovery: ConfigDiscovery, env_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            discovery,
            env_dir: env_dir.into(),
        }
    }

    fn resolve_target(&self) -> Result<ConfigTarget, ConfigStoreError> {
        let candidates = self.discovery.utf8_candidates();
        if candidates.is_empty() {
            return Err(ConfigStoreError::NoCandidates);
        }

        for candidate in &candidates {
            if path_exists(candidate)? {
                return Ok(ConfigTarget {
                    path: candidate.clone(),
                    exists: true,
                });
            }
        }

        let fallback = candidates
            .last()
            .cloned()
            .ok_or(ConfigStoreError::NoCandidates)?;
        Ok(ConfigTarget {
            path: fallback,
            exists: false,
        })
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigWriter for ConfigStore {
    fn write_config_template(&self, force: bool) -> Result<Utf8PathBuf, ConfigStoreError> {
        let target = self.resolve_target()?;
        if target.exists && !force {
            return Err(ConfigStoreError::AlreadyExists { path: target.path });
        }
        write_file(&target.path, &config_template())?;
        Ok(target.path)
    }

    fn write_env_template(&self, force: bool) -> Result<Utf8PathBuf, ConfigStoreError> {
        let path = self.env_dir.join(ENV_TEMPLATE_NAME);
        if path_exists(&path)? && !force {
            return Err(ConfigStoreError::AlreadyExists { path });
        }
        write_file(&path, ENV_TEMPLATE)?;
        Ok(path)
    }
}

#[derive(Clone, Debug)]
struct ConfigTarget {
    path: Utf8PathBuf,
    exists: bool,
}

const ENV_TEMPLATE: &str = "\
# Copy to .env and fill in. Exported variables take precedence.
FLUENCE_API_KEY=your-api-key
SSH_PUBLIC_KEY=ssh-ed25519 AAAA... user@host
";

/// Renders the starter configuration with the built-in defaults.
#[must_use]
pub fn config_template() -> String {
    format!(
        "\
# fvm configuration. Environment variables prefixed with FLUENCE_ override
# these values, for example FLUENCE_REGION=DE.
api_url: {DEFAULT_API_URL}
# Secrets are better kept in .env; see .env.example.
# api_key: your-api-key
# ssh_public_key: ssh-ed25519 AAAA... user@host

# Defaults for new VMs.
cpu_count: 2
memory_gb: 4
storage_gb: 25
region: US
name_prefix: fvm-
os_image: {DEFAULT_OS_IMAGE}
open_ports: \"{DEFAULT_OPEN_PORTS}\"

# Optional hardware preferences.
# cpu_manufacturer: AMD
# cpu_architecture: Zen
# storage_type: SSD

# Status polling.
default_timeout_secs: 300
poll_interval_secs: 10
"
    )
}

fn split_path(path: &Utf8Path) -> Result<(&Utf8Path, &str), ConfigStoreError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigStoreError::InvalidStructure {
            path: path.to_path_buf(),
            message: String::from("path is missing a filename"),
        })?;
    Ok((parent, file_name))
}

fn path_exists(path: &Utf8Path) -> Result<bool, ConfigStoreError> {
    let (parent, file_name) = split_path(path)?;
    match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir
            .try_exists(file_name)
            .map_err(|err| ConfigStoreError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(ConfigStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<(), ConfigStoreError> {
    let (parent, file_name) = split_path(path)?;
    Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(|err| {
        ConfigStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    let dir =
        Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| ConfigStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        })?;
    dir.write(file_name, contents)
        .map_err(|err| ConfigStoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests;
