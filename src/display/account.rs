//! SSH keys and the effective configuration.

use colored::Colorize;
use comfy_table::{Cell, Color};

use super::{DisplayError, OutputFormat, or_dash, table_with_header, to_json};
use crate::api::types::SshKey;
use crate::config::ConfigSummary;

const FINGERPRINT_WIDTH: usize = 24;

/// Renders the account's SSH keys.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_ssh_keys(keys: &[SshKey], format: OutputFormat) -> Result<String, DisplayError> {
    match format {
        OutputFormat::Json => to_json(keys),
        OutputFormat::Compact => Ok(keys
            .iter()
            .map(|key| format!("{} - {}\n", key.name, key.fingerprint))
            .collect()),
        OutputFormat::Table => {
            let mut table = table_with_header(&["Name", "Fingerprint", "Algorithm", "Created"]);
            for key in keys {
                let fingerprint: String = key.fingerprint.chars().take(FINGERPRINT_WIDTH).collect();
                let shortened = if key.fingerprint.chars().count() > FINGERPRINT_WIDTH {
                    format!("{fingerprint}...")
                } else {
                    fingerprint
                };
                table.add_row(vec![
                    Cell::new(or_dash(&key.name)).fg(Color::Green),
                    Cell::new(shortened),
                    Cell::new(or_dash(key.algorithm.as_deref().unwrap_or_default())),
                    Cell::new(or_dash(key.created_at.as_deref().unwrap_or_default())),
                ]);
            }
            Ok(format!("{table}\n"))
        }
    }
}

/// Renders the effective configuration with secrets reduced to set/unset.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_config_summary(
    summary: &ConfigSummary,
    format: OutputFormat,
) -> Result<String, DisplayError> {
    if format.is_json() {
        return to_json(summary);
    }
    let flag = |set: bool| {
        if set {
            "Set".green().to_string()
        } else {
            "Not Set".red().to_string()
        }
    };
    let optional = |value: Option<&String>| value.map_or_else(|| String::from("-"), Clone::clone);
    let entries = [
        ("API", vec![
            ("API URL", summary.api_url.clone()),
            ("API Key", flag(summary.api_key_set)),
            ("SSH Public Key", flag(summary.ssh_key_set)),
        ]),
        ("VM Defaults", vec![
            ("CPU Count", summary.cpu_count.to_string()),
            ("Memory (GB)", summary.memory_gb.to_string()),
            ("Storage (GB)", summary.storage_gb.to_string()),
            ("Region", summary.region.clone()),
            ("Name Prefix", summary.name_prefix.clone()),
            ("OS Image", summary.os_image.clone()),
            ("Open Ports", summary.open_ports.join(", ")),
        ]),
        ("Hardware Preferences", vec![
            ("CPU Manufacturer", optional(summary.cpu_manufacturer.as_ref())),
            ("CPU Architecture", optional(summary.cpu_architecture.as_ref())),
            ("Storage Type", optional(summary.storage_type.as_ref())),
        ]),
        ("Timeouts", vec![
            ("Default Timeout (s)", summary.default_timeout_secs.to_string()),
            ("Poll Interval (s)", summary.poll_interval_secs.to_string()),
        ]),
    ];
    Ok(entries
        .iter()
        .map(|(title, rows)| {
            let body: String = rows
                .iter()
                .map(|(label, value)| format!("  {label}: {}\n", or_dash(value)))
                .collect();
            format!("{}\n{body}\n", title.bold())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary() -> ConfigSummary {
        ConfigSummary {
            api_url: String::from("https://api.fluence.dev"),
            api_key_set: true,
            ssh_key_set: false,
            cpu_count: 2,
            memory_gb: 4,
            storage_gb: 25,
            region: String::from("US"),
            name_prefix: String::from("fvm-"),
            os_image: String::from("https://images.example/ubuntu.img"),
            cpu_manufacturer: Some(String::from("AMD")),
            cpu_architecture: None,
            storage_type: None,
            open_ports: vec![String::from("22/tcp"), String::from("80/tcp")],
            default_timeout_secs: 300,
            poll_interval_secs: 10,
        }
    }

    #[test]
    fn summary_hides_secrets() {
        colored::control::set_override(false);
        let rendered = render_config_summary(&summary(), OutputFormat::Table)
            .unwrap_or_else(|err| panic!("render: {err}"));
        assert!(rendered.contains("API Key: Set"), "{rendered}");
        assert!(rendered.contains("SSH Public Key: Not Set"), "{rendered}");
        assert!(rendered.contains("Open Ports: 22/tcp, 80/tcp"), "{rendered}");
        assert!(rendered.contains("CPU Architecture: -"), "{rendered}");
    }

    #[test]
    fn summary_json_reports_flags_only() {
        let rendered = render_config_summary(&summary(), OutputFormat::Json)
            .unwrap_or_else(|err| panic!("render: {err}"));
        let parsed: serde_json::Value =
            serde_json::from_str(&rendered).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(parsed.get("api_key_set"), Some(&json!(true)));
        assert_eq!(parsed.get("api_key"), None);
    }

    #[test]
    fn long_fingerprints_are_shortened() {
        let keys: Vec<SshKey> = serde_json::from_value(json!([{
            "name": "laptop",
            "publicKey": "ssh-ed25519 AAAA",
            "fingerprint": "SHA256:abcdefghijklmnopqrstuvwxyz0123456789",
            "algorithm": "ssh-ed25519"
        }]))
        .unwrap_or_else(|err| panic!("fixture: {err}"));
        let rendered = render_ssh_keys(&keys, OutputFormat::Table)
            .unwrap_or_else(|err| panic!("render: {err}"));
        assert!(rendered.contains("SHA256:abcdefghijklmnopq..."), "{rendered}");
        assert!(rendered.contains("laptop"));
    }
}
