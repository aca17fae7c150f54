//! Core library for the `fvm` Fluence VM marketplace client.
//!
//! The crate exposes a rate-limited HTTP client for the marketplace API,
//! request builders for creating and pricing VMs, a status poller that
//! reports progress as events, and renderers for terminal output.

pub mod api;
pub mod basic_config;
pub mod config;
pub mod config_store;
pub mod display;
pub mod filter;
pub mod ports;
pub mod progress;
pub mod request;
pub mod ssh_key;
pub mod test_support;
pub mod wait;

pub use api::{ApiError, FluenceClient};
pub use basic_config::{BasicConfiguration, BasicConfigurationError, Resolution};
pub use config::{ConfigError, ConfigSummary, FluenceConfig};
pub use config_store::{ConfigStore, ConfigStoreError, ConfigWriter};
pub use display::{DisplayError, OutputFormat};
pub use filter::VmFilter;
pub use ports::{Port, PortError, PortPlan};
pub use request::{
    ImageChoice, RequestError, VmRequest, VmRequestBuilder, is_image_url, resolve_image,
};
pub use ssh_key::{SshKeyError, normalise_public_key};
pub use wait::{StatusWatch, VmSource, WaitError, WaitEvent, WaitOptions, wait_for_status};
