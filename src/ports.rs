//! Open-port specifications and merge rules for `vm update`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PROTOCOL: &str = "tcp";
const PROTOCOLS: [&str; 3] = ["tcp", "udp", "sctp"];

/// A single port opened on a VM, as exchanged with the API.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Port {
    /// Port number in `1..=65535`.
    pub port: u16,
    /// Transport protocol; the API assumes `tcp` when omitted.
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_owned()
}

impl Port {
    /// Creates a TCP port.
    #[must_use]
    pub fn tcp(port: u16) -> Self {
        Self {
            port,
            protocol: default_protocol(),
        }
    }

    /// Parses a comma separated list such as `22/tcp,80/tcp`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError`] for the first entry that fails to parse.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, PortError> {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, protocol) = trimmed
            .split_once('/')
            .unwrap_or((trimmed, DEFAULT_PROTOCOL));
        let port = number
            .trim()
            .parse::<u16>()
            .map_err(|_| PortError::InvalidNumber(trimmed.to_owned()))?;
        if port == 0 {
            return Err(PortError::InvalidNumber(trimmed.to_owned()));
        }
        let normalised = protocol.trim().to_ascii_lowercase();
        if !PROTOCOLS.contains(&normalised.as_str()) {
            return Err(PortError::UnknownProtocol(protocol.trim().to_owned()));
        }
        Ok(Self {
            port,
            protocol: normalised,
        })
    }
}

/// Errors raised while parsing port specifications.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PortError {
    /// Port number is missing, zero, or above 65535.
    #[error("invalid port specification '{0}': expected a number between 1 and 65535")]
    InvalidNumber(String),
    /// Protocol is not one the marketplace accepts.
    #[error("unsupported protocol '{0}': expected tcp, udp, or sctp")]
    UnknownProtocol(String),
}

/// Result of merging requested additions and removals into a VM's ports.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PortPlan {
    /// Final port list to send to the API.
    pub ports: Vec<Port>,
    /// Ports newly added.
    pub added: Vec<Port>,
    /// Ports removed.
    pub removed: Vec<Port>,
    /// Removal requests for ports that were not open.
    pub missing: Vec<Port>,
    /// Addition requests for ports that were already open.
    pub duplicates: Vec<Port>,
}

impl PortPlan {
    /// Applies removals then additions to `current`, preserving order.
    #[must_use]
    pub fn build(current: &[Port], add: &[Port], remove: &[Port]) -> Self {
        let mut plan = Self {
            ports: current.to_vec(),
            ..Self::default()
        };

        for port in remove {
            if let Some(index) = plan.ports.iter().position(|open| open == port) {
                plan.removed.push(plan.ports.remove(index));
            } else {
                plan.missing.push(port.clone());
            }
        }

        for port in add {
            if plan.ports.contains(port) {
                plan.duplicates.push(port.clone());
            } else {
                plan.ports.push(port.clone());
                plan.added.push(port.clone());
            }
        }

        plan
    }

    /// Whether the plan changes the port list at all.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("22", Port::tcp(22))]
    #[case("8080/tcp", Port::tcp(8080))]
    #[case(" 53/UDP ", Port { port: 53, protocol: String::from("udp") })]
    fn parses_port_specs(#[case] input: &str, #[case] expected: Port) {
        let parsed: Port = input
            .parse()
            .unwrap_or_else(|err| panic!("{input} should parse: {err}"));
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("0")]
    #[case("70000/tcp")]
    #[case("http")]
    fn rejects_out_of_range_ports(#[case] input: &str) {
        let err = input.parse::<Port>().expect_err("port should be rejected");
        assert!(matches!(err, PortError::InvalidNumber(_)), "{err}");
    }

    #[test]
    fn rejects_unknown_protocols() {
        let err = "22/icmp".parse::<Port>().expect_err("icmp unsupported");
        assert_eq!(err, PortError::UnknownProtocol(String::from("icmp")));
    }

    #[test]
    fn parse_list_skips_blank_entries() {
        let ports = Port::parse_list("22/tcp, 80 ,,443/tcp")
            .unwrap_or_else(|err| panic!("list should parse: {err}"));
        assert_eq!(ports, vec![Port::tcp(22), Port::tcp(80), Port::tcp(443)]);
    }

    #[test]
    fn plan_reports_missing_and_duplicate_ports() {
        let current = vec![Port::tcp(22), Port::tcp(80)];
        let plan = PortPlan::build(
            &current,
            &[Port::tcp(8080), Port::tcp(22)],
            &[Port::tcp(80), Port::tcp(443)],
        );

        assert_eq!(plan.ports, vec![Port::tcp(22), Port::tcp(8080)]);
        assert_eq!(plan.added, vec![Port::tcp(8080)]);
        assert_eq!(plan.removed, vec![Port::tcp(80)]);
        assert_eq!(plan.missing, vec![Port::tcp(443)]);
        assert_eq!(plan.duplicates, vec![Port::tcp(22)]);
        assert!(plan.has_changes());
    }

    #[test]
    fn plan_without_effective_changes_is_empty() {
        let current = vec![Port::tcp(22)];
        let plan = PortPlan::build(&current, &[Port::tcp(22)], &[]);
        assert!(!plan.has_changes());
        assert_eq!(plan.ports, current);
    }
}
