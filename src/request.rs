//! Assembly of create and estimate requests from flags and defaults.

use thiserror::Error;
use uuid::Uuid;

use crate::api::types::{
    Constraints, CpuConstraint, CreateVmRequest, DatacenterConstraint, EstimateRequest,
    HardwareConstraint, OsImage, StorageConstraint, VmConfiguration,
};
use crate::basic_config::{BasicConfiguration, BasicConfigurationError, Resolution};
use crate::config::{ConfigError, FluenceConfig};
use crate::ports::Port;
use crate::ssh_key::{SshKeyError, normalise_public_key};

const GENERATED_SUFFIX_LEN: usize = 8;

/// A validated VM request ready to be rendered as an API body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VmRequest {
    /// VM name, generated when none was supplied.
    pub name: String,
    /// How the requested shape mapped onto the standard configurations.
    pub resolution: Resolution,
    /// Datacenter country code.
    pub region: String,
    /// Hardware preferences, omitted when nothing is preferred.
    pub hardware: Option<HardwareConstraint>,
    /// OS image URL.
    pub os_image: String,
    /// Ports to open.
    pub open_ports: Vec<Port>,
    /// Normalised SSH public key, absent for estimates.
    pub ssh_key: Option<String>,
}

impl VmRequest {
    /// Starts a builder for a [`VmRequest`].
    #[must_use]
    pub fn builder() -> VmRequestBuilder {
        VmRequestBuilder::new()
    }

    fn constraints(&self) -> Constraints {
        Constraints {
            basic_configuration: Some(self.resolution.configuration().to_string()),
            datacenter: Some(DatacenterConstraint {
                countries: vec![self.region.clone()],
            }),
            hardware: self.hardware.clone(),
        }
    }

    /// Body for `POST vms/v3`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingField`] when no SSH key was supplied.
    pub fn create_request(&self) -> Result<CreateVmRequest, RequestError> {
        let ssh_key = self
            .ssh_key
            .clone()
            .ok_or_else(|| RequestError::MissingField(String::from("ssh_key")))?;
        Ok(CreateVmRequest {
            constraints: self.constraints(),
            instances: 1,
            vm_configuration: VmConfiguration {
                name: self.name.clone(),
                open_ports: self.open_ports.clone(),
                ssh_keys: vec![ssh_key],
                os_image: self.os_image.clone(),
            },
        })
    }

    /// Body for `POST vms/v3/estimate`.
    #[must_use]
    pub fn estimate_request(&self) -> EstimateRequest {
        EstimateRequest {
            constraints: self.constraints(),
            instances: 1,
        }
    }
}

/// Builder for [`VmRequest`] that defers trimming and validation to
/// construction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VmRequestBuilder {
    name: Option<String>,
    name_prefix: String,
    cpu: u32,
    memory_gb: u32,
    storage_gb: u32,
    region: String,
    os_image: String,
    open_ports: Vec<Port>,
    ssh_key: Option<String>,
    cpu_manufacturer: Option<String>,
    cpu_architecture: Option<String>,
    storage_type: Option<String>,
}

impl VmRequestBuilder {
    /// Creates an empty builder; fields must be populated before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a builder with the configured VM defaults. The SSH key is not
    /// copied; set it with [`Self::ssh_key`] when creating.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Ports`] when the configured ports are malformed.
    pub fn from_config(config: &FluenceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: None,
            name_prefix: config.name_prefix.clone(),
            cpu: config.cpu_count,
            memory_gb: config.memory_gb,
            storage_gb: config.storage_gb,
            region: config.region.clone(),
            os_image: config.os_image.clone(),
            open_ports: config.open_ports()?,
            ssh_key: None,
            cpu_manufacturer: config.cpu_manufacturer.clone(),
            cpu_architecture: config.cpu_architecture.clone(),
            storage_type: config.storage_type.clone(),
        })
    }

    /// Sets the VM name; `None` keeps the generated name.
    #[must_use]
    pub fn name(mut self, value: Option<String>) -> Self {
        if value.is_some() {
            self.name = value;
        }
        self
    }

    /// Sets the prefix used for generated names.
    #[must_use]
    pub fn name_prefix(mut self, value: impl Into<String>) -> Self {
        self.name_prefix = value.into();
        self
    }

    /// Overrides the vCPU count when `Some`.
    #[must_use]
    pub fn cpu(mut self, value: Option<u32>) -> Self {
        if let Some(cpu) = value {
            self.cpu = cpu;
        }
        self
    }

    /// Overrides memory in gigabytes when `Some`.
    #[must_use]
    pub fn memory_gb(mut self, value: Option<u32>) -> Self {
        if let Some(memory) = value {
            self.memory_gb = memory;
        }
        self
    }

    /// Overrides storage in gigabytes when `Some`.
    #[must_use]
    pub fn storage_gb(mut self, value: Option<u32>) -> Self {
        if let Some(storage) = value {
            self.storage_gb = storage;
        }
        self
    }

    /// Overrides the datacenter country when `Some`.
    #[must_use]
    pub fn region(mut self, value: Option<String>) -> Self {
        if let Some(region) = value {
            self.region = region;
        }
        self
    }

    /// Sets the OS image URL.
    #[must_use]
    pub fn os_image(mut self, value: impl Into<String>) -> Self {
        self.os_image = value.into();
        self
    }

    /// Replaces the ports to open.
    #[must_use]
    pub fn open_ports(mut self, value: Vec<Port>) -> Self {
        self.open_ports = value;
        self
    }

    /// Sets the SSH public key in any form [`normalise_public_key`] accepts.
    #[must_use]
    pub fn ssh_key(mut self, value: impl Into<String>) -> Self {
        self.ssh_key = Some(value.into());
        self
    }

    /// Sets the preferred CPU manufacturer.
    #[must_use]
    pub fn cpu_manufacturer(mut self, value: Option<String>) -> Self {
        self.cpu_manufacturer = value;
        self
    }

    /// Sets the preferred CPU architecture.
    #[must_use]
    pub fn cpu_architecture(mut self, value: Option<String>) -> Self {
        self.cpu_architecture = value;
        self
    }

    /// Sets the preferred storage type.
    #[must_use]
    pub fn storage_type(mut self, value: Option<String>) -> Self {
        self.storage_type = value;
        self
    }

    /// Builds and validates the [`VmRequest`], trimming string inputs.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a required field is empty, the shape has
    /// a zero quantity, or the SSH key is unrecognised.
    pub fn build(self) -> Result<VmRequest, RequestError> {
        let region = required(&self.region, "region")?;
        let os_image = required(&self.os_image, "os_image")?;
        let shape = BasicConfiguration::new(self.cpu, self.memory_gb, self.storage_gb)?;
        let ssh_key = self
            .ssh_key
            .as_deref()
            .map(normalise_public_key)
            .transpose()?;
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|given| !given.is_empty())
            .map_or_else(|| generate_name(self.name_prefix.trim()), str::to_owned);

        Ok(VmRequest {
            name,
            resolution: shape.resolve(),
            region: region.to_uppercase(),
            hardware: hardware_constraint(
                self.cpu_manufacturer.as_deref(),
                self.cpu_architecture.as_deref(),
                self.storage_type.as_deref(),
            ),
            os_image,
            open_ports: self.open_ports,
            ssh_key,
        })
    }
}

/// Generates `<prefix><8 hex characters>`.
#[must_use]
pub fn generate_name(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(GENERATED_SUFFIX_LEN)
        .collect();
    format!("{prefix}{suffix}")
}

fn required(value: &str, field: &str) -> Result<String, RequestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RequestError::MissingField(field.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn hardware_constraint(
    manufacturer: Option<&str>,
    architecture: Option<&str>,
    storage_type: Option<&str>,
) -> Option<HardwareConstraint> {
    let cpu = CpuConstraint {
        manufacturer: non_blank(manufacturer),
        architecture: non_blank(architecture),
    };
    let mut constraint = HardwareConstraint::default();
    if cpu.manufacturer.is_some() || cpu.architecture.is_some() {
        constraint.cpu.push(cpu);
    }
    if let Some(kind) = non_blank(storage_type) {
        constraint.storage.push(StorageConstraint { kind });
    }
    (!constraint.is_empty()).then_some(constraint)
}

/// How an `--image` argument was resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageChoice {
    /// The argument was already a URL.
    Url(String),
    /// The argument matched a catalogue slug.
    Catalogue {
        /// Matched image slug.
        slug: String,
        /// Display name of the image.
        name: String,
        /// Download URL sent to the API.
        url: String,
    },
    /// The slug is unknown; the fallback URL is used.
    Fallback {
        /// Slug that did not match.
        slug: String,
        /// URL used instead.
        url: String,
    },
}

impl ImageChoice {
    /// URL to send to the API.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Catalogue { url, .. } | Self::Fallback { url, .. } => url,
        }
    }
}

/// Whether an `--image` argument is already a download URL.
#[must_use]
pub fn is_image_url(choice: &str) -> bool {
    let trimmed = choice.trim();
    trimmed.starts_with("http://") || trimmed.starts_with("https://")
}

/// Resolves an image slug or URL against the catalogue.
#[must_use]
pub fn resolve_image(choice: &str, catalogue: &[OsImage], fallback: &str) -> ImageChoice {
    let wanted = choice.trim();
    if is_image_url(wanted) {
        return ImageChoice::Url(wanted.to_owned());
    }
    catalogue
        .iter()
        .find(|image| image.slug == wanted && !image.download_url.is_empty())
        .map_or_else(
            || ImageChoice::Fallback {
                slug: wanted.to_owned(),
                url: fallback.to_owned(),
            },
            |image| ImageChoice::Catalogue {
                slug: image.slug.clone(),
                name: image.name.clone(),
                url: image.download_url.clone(),
            },
        )
}

/// Errors raised while building VM requests.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Raised when a request is missing a required field.
    #[error("missing or empty field: {0}")]
    MissingField(String),
    /// Raised when the CPU, memory, or storage quantity is unusable.
    #[error(transparent)]
    Shape(#[from] BasicConfigurationError),
    /// Raised when the SSH key cannot be normalised.
    #[error(transparent)]
    SshKey(#[from] SshKeyError),
}
