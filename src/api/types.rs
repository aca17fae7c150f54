//! Wire types exchanged with the marketplace API.
//!
//! Responses keep any fields the client does not model in an `extra` map so
//! JSON output shows everything the API returned.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ports::Port;

/// Status reported by VMs that are running and reachable.
pub const ACTIVE_STATUS: &str = "Active";

/// Price or quantity that the API encodes either as a number or a string.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    /// Numeric encoding.
    Number(f64),
    /// Textual encoding, usually a decimal string.
    Text(String),
}

impl Amount {
    /// Numeric value when the amount is a number or a parseable string.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One entry of a VM's `resources` list.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Resource kind, for example `VCPU`, `RAM`, or `STORAGE`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Quantity supplied to the VM.
    #[serde(default)]
    pub supply: u64,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Location of a VM or offer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Datacenter {
    /// ISO country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// City code within the country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Datacenter {
    /// Renders the location as `COUNTRY/CITY`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.country_code.as_deref().unwrap_or_default(),
            self.city_code.as_deref().unwrap_or_default()
        )
    }
}

/// A VM as returned by `GET vms/v3`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vm {
    /// Opaque VM identifier.
    #[serde(default)]
    pub id: String,
    /// User supplied name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    /// Free-text lifecycle status such as `Launching` or `Active`.
    #[serde(default)]
    pub status: String,
    /// Public IPv4 address once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    /// Allocated resources keyed by type.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Hosting datacenter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<Datacenter>,
    /// Ports open to the internet.
    #[serde(default)]
    pub ports: Vec<Port>,
    /// OS image URL the VM was booted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_image: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Next billing timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_billing_at: Option<String>,
    /// Price charged per billing epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_epoch: Option<Amount>,
    /// Total amount spent on this VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<Amount>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vm {
    /// Compares the status with `target`, ignoring ASCII case.
    #[must_use]
    pub fn status_is(&self, target: &str) -> bool {
        self.status.eq_ignore_ascii_case(target.trim())
    }

    /// Whether the VM reports the `Active` status.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status_is(ACTIVE_STATUS)
    }

    /// Name for display, empty when unnamed.
    #[must_use]
    pub fn name(&self) -> &str {
        self.vm_name.as_deref().unwrap_or_default()
    }

    fn supply(&self, kind: &str) -> u64 {
        self.resources
            .iter()
            .find(|resource| resource.kind.eq_ignore_ascii_case(kind))
            .map_or(0, |resource| resource.supply)
    }

    /// Number of virtual CPUs.
    #[must_use]
    pub fn cpu_count(&self) -> u64 {
        self.supply("VCPU")
    }

    /// Memory in gigabytes.
    #[must_use]
    pub fn memory_gb(&self) -> u64 {
        self.supply("RAM")
    }

    /// Storage in gigabytes.
    #[must_use]
    pub fn storage_gb(&self) -> u64 {
        self.supply("STORAGE")
    }

    /// Country code of the hosting datacenter.
    #[must_use]
    pub fn region(&self) -> &str {
        self.datacenter
            .as_ref()
            .and_then(|dc| dc.country_code.as_deref())
            .unwrap_or_default()
    }

    /// Open ports rendered as `22/tcp, 80/tcp`.
    #[must_use]
    pub fn ports_label(&self) -> String {
        self.ports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Entry of the list returned by `POST vms/v3`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedVm {
    /// Identifier of the new VM.
    #[serde(default, alias = "id")]
    pub vm_id: String,
    /// Name assigned to the VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Datacenter constraint for create, estimate, and offer queries.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DatacenterConstraint {
    /// Acceptable country codes.
    pub countries: Vec<String>,
}

/// CPU preference inside a hardware constraint.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuConstraint {
    /// CPU manufacturer, for example `AMD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// CPU architecture, for example `Zen`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

/// Storage preference inside a hardware constraint.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StorageConstraint {
    /// Storage type, for example `SSD`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Hardware preferences for placement.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HardwareConstraint {
    /// Acceptable CPUs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpu: Vec<CpuConstraint>,
    /// Acceptable storage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<StorageConstraint>,
}

impl HardwareConstraint {
    /// Whether the constraint restricts nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty() && self.storage.is_empty()
    }
}

/// Placement constraints shared by create, estimate, and offer queries.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Basic configuration slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_configuration: Option<String>,
    /// Datacenter restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<DatacenterConstraint>,
    /// Hardware restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareConstraint>,
}

/// VM settings applied at creation time.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmConfiguration {
    /// VM name.
    pub name: String,
    /// Ports to open.
    pub open_ports: Vec<Port>,
    /// Authorised SSH public keys.
    pub ssh_keys: Vec<String>,
    /// OS image URL.
    pub os_image: String,
}

/// Body of `POST vms/v3`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVmRequest {
    /// Placement constraints.
    pub constraints: Constraints,
    /// Number of instances to create.
    pub instances: u32,
    /// Per-VM settings.
    pub vm_configuration: VmConfiguration,
}

/// Body of `POST vms/v3/estimate`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    /// Placement constraints.
    pub constraints: Constraints,
    /// Number of instances to price.
    pub instances: u32,
}

/// Price estimate returned by `POST vms/v3/estimate`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Price per billing epoch (one day) for all instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price_per_epoch: Option<Amount>,
    /// Hourly price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_price_usd: Option<Amount>,
    /// Daily price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_price_usd: Option<Amount>,
    /// Monthly price in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_price_usd: Option<Amount>,
    /// Deposit required up front.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount_usdc: Option<Amount>,
    /// Number of epochs covered by the deposit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_epochs: Option<u64>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Estimate {
    /// Daily price, preferring the explicit field over the epoch total.
    #[must_use]
    pub fn daily(&self) -> Option<f64> {
        self.daily_price_usd
            .as_ref()
            .or(self.total_price_per_epoch.as_ref())
            .and_then(Amount::as_f64)
    }

    /// Hourly price, derived from the daily price when absent.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "prices are display-only approximations"
    )]
    pub fn hourly(&self) -> Option<f64> {
        self.hourly_price_usd
            .as_ref()
            .and_then(Amount::as_f64)
            .or_else(|| self.daily().map(|daily| daily / 24.0))
    }

    /// Thirty-day price, derived from the daily price when absent.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "prices are display-only approximations"
    )]
    pub fn monthly(&self) -> Option<f64> {
        self.monthly_price_usd
            .as_ref()
            .and_then(Amount::as_f64)
            .or_else(|| self.daily().map(|daily| daily * 30.0))
    }
}

/// CPU family offered by providers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CpuOption {
    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: String,
    /// Micro-architecture name.
    #[serde(default)]
    pub architecture: String,
}

/// Memory family offered by providers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemoryOption {
    /// Memory type, for example `DDR`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Memory generation, for example `5`.
    #[serde(default)]
    pub generation: String,
}

/// Storage family offered by providers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StorageOption {
    /// Storage type, for example `NVMe`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Hardware catalogue returned by `GET marketplace/v3/hardware`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HardwareOptions {
    /// CPU options.
    #[serde(default)]
    pub cpu: Vec<CpuOption>,
    /// Memory options.
    #[serde(default)]
    pub memory: Vec<MemoryOption>,
    /// Storage options.
    #[serde(default)]
    pub storage: Vec<StorageOption>,
}

impl HardwareOptions {
    /// Whether the catalogue lists nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty() && self.memory.is_empty() && self.storage.is_empty()
    }
}

/// Default OS image returned by `GET vms/v3/default_images`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OsImage {
    /// Short identifier used with `--image`.
    #[serde(default)]
    pub slug: String,
    /// Human readable name.
    #[serde(default)]
    pub name: String,
    /// Distribution family.
    #[serde(default)]
    pub distribution: String,
    /// Default login user.
    #[serde(default)]
    pub username: String,
    /// Image download URL passed to VM creation.
    #[serde(default)]
    pub download_url: String,
    /// Publication timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Configuration advertised by an offer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferConfiguration {
    /// Basic configuration slug.
    #[serde(default)]
    pub slug: String,
    /// Price per epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Amount>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Provider server backing an offer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferServer {
    /// Instances of the basic configuration still available.
    #[serde(default)]
    pub available_basic_instances: u32,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marketplace offer returned by `POST marketplace/offers`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Advertised configuration and price.
    #[serde(default)]
    pub configuration: OfferConfiguration,
    /// Offer location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<Datacenter>,
    /// Servers with capacity for this offer.
    #[serde(default)]
    pub servers: Vec<OfferServer>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Offer {
    /// Total instances available across all servers.
    #[must_use]
    pub fn available_instances(&self) -> u32 {
        self.servers
            .iter()
            .map(|server| server.available_basic_instances)
            .fold(0, u32::saturating_add)
    }
}

/// SSH key registered with the account.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    /// Key name.
    #[serde(default)]
    pub name: String,
    /// Public key material.
    #[serde(default)]
    pub public_key: String,
    /// Key fingerprint used for removal.
    #[serde(default)]
    pub fingerprint: String,
    /// Key algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Trailing comment of the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Whether the key is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Registration timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields not modelled by the client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST ssh_keys`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSshKey {
    /// Key name.
    pub name: String,
    /// Normalised public key material.
    pub public_key: String,
}

/// Body of `DELETE ssh_keys`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SshKeyRemoval {
    /// Fingerprint of the key to remove.
    pub fingerprint: String,
}

/// Body of `DELETE vms/v3`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVmsRequest {
    /// VMs to terminate.
    pub vm_ids: Vec<String>,
}

/// A single VM change inside `PATCH vms/v3`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmUpdate {
    /// VM to change.
    pub id: String,
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    /// Replacement port list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ports: Option<Vec<Port>>,
}

impl VmUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vm_name.is_none() && self.open_ports.is_none()
    }
}

/// Body of `PATCH vms/v3`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UpdateVmsRequest {
    /// Changes to apply.
    pub updates: Vec<VmUpdate>,
}

/// Body of `PUT vms/v3/{id}/scale`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScaleRequest {
    /// Target CPU count.
    pub cpu: u32,
    /// Target memory in gigabytes.
    pub memory: u32,
    /// Preferred CPU manufacturer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_manufacturer: Option<String>,
    /// Preferred CPU architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_architecture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_vm() -> Vm {
        serde_json::from_value(json!({
            "id": "0x1234",
            "vmName": "web-1",
            "status": "Active",
            "publicIp": "203.0.113.7",
            "resources": [
                {"type": "VCPU", "supply": 2, "details": {}},
                {"type": "RAM", "supply": 4},
                {"type": "STORAGE", "supply": 25}
            ],
            "datacenter": {"countryCode": "US", "cityCode": "NYC", "tier": 3},
            "ports": [{"port": 22, "protocol": "tcp"}, {"port": 53}],
            "pricePerEpoch": "1.25",
            "reservedUntil": "2026-01-01"
        }))
        .unwrap_or_else(|err| panic!("sample VM should decode: {err}"))
    }

    #[test]
    fn vm_accessors_read_nested_resources() {
        let vm = sample_vm();
        assert_eq!(vm.cpu_count(), 2);
        assert_eq!(vm.memory_gb(), 4);
        assert_eq!(vm.storage_gb(), 25);
        assert_eq!(vm.region(), "US");
        assert_eq!(
            vm.datacenter.as_ref().map(Datacenter::label).as_deref(),
            Some("US/NYC")
        );
        assert_eq!(vm.ports_label(), "22/tcp, 53/tcp");
        assert_eq!(
            vm.price_per_epoch.as_ref().and_then(Amount::as_f64),
            Some(1.25)
        );
    }

    #[test]
    fn vm_status_comparison_ignores_case() {
        let vm = sample_vm();
        assert!(vm.status_is("active"));
        assert!(vm.is_active());
        assert!(!vm.status_is("Launching"));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let vm = sample_vm();
        assert_eq!(vm.extra.get("reservedUntil"), Some(&json!("2026-01-01")));
        let encoded = serde_json::to_value(&vm)
            .unwrap_or_else(|err| panic!("VM should encode: {err}"));
        assert_eq!(encoded.get("reservedUntil"), Some(&json!("2026-01-01")));
        assert_eq!(encoded.pointer("/datacenter/tier"), Some(&json!(3)));
    }

    #[test]
    fn estimate_derives_missing_prices_from_daily_total() {
        let estimate: Estimate = serde_json::from_value(json!({"totalPricePerEpoch": "2.4"}))
            .unwrap_or_else(|err| panic!("estimate should decode: {err}"));
        assert_eq!(estimate.daily(), Some(2.4));
        let hourly = estimate.hourly().unwrap_or_default();
        assert!((hourly - 0.1).abs() < 1e-9, "hourly: {hourly}");
        let monthly = estimate.monthly().unwrap_or_default();
        assert!((monthly - 72.0).abs() < 1e-9, "monthly: {monthly}");
    }

    #[test]
    fn create_request_uses_api_field_names() {
        let request = CreateVmRequest {
            constraints: Constraints {
                basic_configuration: Some(String::from("cpu-2-ram-4gb-storage-25gb")),
                datacenter: Some(DatacenterConstraint {
                    countries: vec![String::from("DE")],
                }),
                hardware: None,
            },
            instances: 1,
            vm_configuration: VmConfiguration {
                name: String::from("fvm-abc"),
                open_ports: vec![Port::tcp(22)],
                ssh_keys: vec![String::from("ssh-ed25519 AAAA")],
                os_image: String::from("https://images.example/ubuntu.img"),
            },
        };
        let encoded = serde_json::to_value(&request)
            .unwrap_or_else(|err| panic!("request should encode: {err}"));
        assert_eq!(
            encoded,
            json!({
                "constraints": {
                    "basicConfiguration": "cpu-2-ram-4gb-storage-25gb",
                    "datacenter": {"countries": ["DE"]}
                },
                "instances": 1,
                "vmConfiguration": {
                    "name": "fvm-abc",
                    "openPorts": [{"port": 22, "protocol": "tcp"}],
                    "sshKeys": ["ssh-ed25519 AAAA"],
                    "osImage": "https://images.example/ubuntu.img"
                }
            })
        );
    }

    #[test]
    fn offer_sums_available_instances() {
        let offer: Offer = serde_json::from_value(json!({
            "configuration": {"slug": "cpu-2-ram-4gb-storage-25gb", "price": 1.5},
            "servers": [{"availableBasicInstances": 3}, {"availableBasicInstances": 4}]
        }))
        .unwrap_or_else(|err| panic!("offer should decode: {err}"));
        assert_eq!(offer.available_instances(), 7);
    }
}
