//! Canonical `cpu-N-ram-Mgb-storage-Sgb` size tiers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Storage size used by every standard configuration.
pub const STANDARD_STORAGE_GB: u32 = 25;

/// Size tiers offered by the marketplace as `(cpu, ram_gb)` pairs.
const STANDARD_SHAPES: [(u32, u32); 5] = [(1, 1), (1, 2), (2, 2), (2, 4), (4, 8)];

/// A basic configuration: CPU count, RAM, and storage in gigabytes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BasicConfiguration {
    /// Number of virtual CPUs.
    pub cpu: u32,
    /// Memory in gigabytes.
    pub ram_gb: u32,
    /// Storage in gigabytes.
    pub storage_gb: u32,
}

/// Errors raised when parsing or constructing a basic configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BasicConfigurationError {
    /// The text does not follow `cpu-N-ram-Mgb-storage-Sgb`.
    #[error("malformed basic configuration '{0}': expected cpu-N-ram-Mgb-storage-Sgb")]
    Malformed(String),
    /// One of the quantities is zero.
    #[error("basic configuration quantities must be greater than zero")]
    ZeroQuantity,
}

/// Outcome of matching a requested shape against the standard list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// The request is itself a standard configuration.
    Exact(BasicConfiguration),
    /// A larger standard configuration was chosen to cover the request.
    Substituted {
        /// Shape asked for by the user.
        requested: BasicConfiguration,
        /// Standard configuration that will be used instead.
        chosen: BasicConfiguration,
    },
    /// No standard configuration covers the request; it is sent unchanged.
    Custom(BasicConfiguration),
}

impl Resolution {
    /// The configuration that should be sent to the API.
    #[must_use]
    pub const fn configuration(&self) -> BasicConfiguration {
        match *self {
            Self::Exact(config) | Self::Custom(config) => config,
            Self::Substituted { chosen, .. } => chosen,
        }
    }
}

impl BasicConfiguration {
    /// Builds a configuration, rejecting zero quantities.
    ///
    /// # Errors
    ///
    /// Returns [`BasicConfigurationError::ZeroQuantity`] when any field is 0.
    pub const fn new(
        cpu: u32,
        ram_gb: u32,
        storage_gb: u32,
    ) -> Result<Self, BasicConfigurationError> {
        if cpu == 0 || ram_gb == 0 || storage_gb == 0 {
            return Err(BasicConfigurationError::ZeroQuantity);
        }
        Ok(Self {
            cpu,
            ram_gb,
            storage_gb,
        })
    }

    /// Returns the standard configurations in ascending size order.
    #[must_use]
    pub fn standard() -> Vec<Self> {
        STANDARD_SHAPES
            .iter()
            .map(|&(cpu, ram_gb)| Self {
                cpu,
                ram_gb,
                storage_gb: STANDARD_STORAGE_GB,
            })
            .collect()
    }

    /// Whether `self` provides at least the resources of `other`.
    #[must_use]
    pub const fn covers(&self, other: &Self) -> bool {
        self.cpu >= other.cpu && self.ram_gb >= other.ram_gb && self.storage_gb >= other.storage_gb
    }

    /// Matches the requested shape against the standard list.
    #[must_use]
    pub fn resolve(self) -> Resolution {
        let standard = Self::standard();
        if standard.contains(&self) {
            return Resolution::Exact(self);
        }
        standard
            .into_iter()
            .find(|candidate| candidate.covers(&self))
            .map_or(Resolution::Custom(self), |chosen| Resolution::Substituted {
                requested: self,
                chosen,
            })
    }
}

impl fmt::Display for BasicConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cpu-{}-ram-{}gb-storage-{}gb",
            self.cpu, self.ram_gb, self.storage_gb
        )
    }
}

impl FromStr for BasicConfiguration {
    type Err = BasicConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || BasicConfigurationError::Malformed(s.to_owned());
        let parts: Vec<&str> = s.trim().split('-').collect();
        let [cpu_label, cpu, ram_label, ram, storage_label, storage] = parts.as_slice() else {
            return Err(malformed());
        };
        if *cpu_label != "cpu" || *ram_label != "ram" || *storage_label != "storage" {
            return Err(malformed());
        }
        let parse_gb = |value: &str| {
            value
                .strip_suffix("gb")
                .and_then(|number| number.parse::<u32>().ok())
                .ok_or_else(malformed)
        };
        let cpu_count = cpu.parse::<u32>().map_err(|_| malformed())?;
        Self::new(cpu_count, parse_gb(*ram)?, parse_gb(*storage)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(cpu: u32, ram_gb: u32, storage_gb: u32) -> BasicConfiguration {
        BasicConfiguration::new(cpu, ram_gb, storage_gb)
            .unwrap_or_else(|err| panic!("valid configuration: {err}"))
    }

    #[test]
    fn parses_canonical_form() {
        let parsed: BasicConfiguration = "cpu-2-ram-4gb-storage-25gb"
            .parse()
            .unwrap_or_else(|err| panic!("should parse: {err}"));
        assert_eq!(parsed, config(2, 4, 25));
        assert_eq!(parsed.to_string(), "cpu-2-ram-4gb-storage-25gb");
    }

    #[rstest]
    #[case("cpu-2-ram-4-storage-25gb")]
    #[case("cpu-2-ram-4gb")]
    #[case("gpu-2-ram-4gb-storage-25gb")]
    #[case("cpu-x-ram-4gb-storage-25gb")]
    fn rejects_malformed_strings(#[case] input: &str) {
        let err = input
            .parse::<BasicConfiguration>()
            .expect_err("should be rejected");
        assert!(matches!(err, BasicConfigurationError::Malformed(_)), "{err}");
    }

    #[test]
    fn rejects_zero_quantities() {
        assert_eq!(
            "cpu-0-ram-4gb-storage-25gb".parse::<BasicConfiguration>(),
            Err(BasicConfigurationError::ZeroQuantity)
        );
    }

    #[test]
    fn resolve_keeps_standard_shapes() {
        assert_eq!(config(2, 4, 25).resolve(), Resolution::Exact(config(2, 4, 25)));
    }

    #[test]
    fn resolve_substitutes_smallest_covering_shape() {
        let resolution = config(2, 3, 25).resolve();
        assert_eq!(
            resolution,
            Resolution::Substituted {
                requested: config(2, 3, 25),
                chosen: config(2, 4, 25),
            }
        );
        assert_eq!(resolution.configuration(), config(2, 4, 25));
    }

    #[test]
    fn resolve_passes_oversized_requests_through() {
        let oversized = config(16, 64, 200);
        assert_eq!(oversized.resolve(), Resolution::Custom(oversized));
    }
}
