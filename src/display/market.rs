//! Marketplace catalogues and price estimates.

use comfy_table::{Cell, Color};

use super::{DisplayError, OutputFormat, or_dash, table_with_header, to_json};
use crate::api::types::{Estimate, HardwareOptions, Offer, OsImage};
use crate::basic_config::BasicConfiguration;

const DATE_WIDTH: usize = 10;

/// Renders the default OS images.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_images(images: &[OsImage], format: OutputFormat) -> Result<String, DisplayError> {
    match format {
        OutputFormat::Json => to_json(images),
        OutputFormat::Compact => Ok(images
            .iter()
            .map(|image| format!("{} - {}\n", image.slug, image.name))
            .collect()),
        OutputFormat::Table => {
            let mut table =
                table_with_header(&["Slug", "Name", "Distribution", "Username", "Created"]);
            for image in images {
                let created: String = image
                    .created_at
                    .as_deref()
                    .unwrap_or_default()
                    .chars()
                    .take(DATE_WIDTH)
                    .collect();
                table.add_row(vec![
                    Cell::new(&image.slug).fg(Color::Green),
                    Cell::new(or_dash(&image.name)),
                    Cell::new(or_dash(&image.distribution)),
                    Cell::new(or_dash(&image.username)),
                    Cell::new(or_dash(&created)),
                ]);
            }
            Ok(format!("{table}\n"))
        }
    }
}

/// Renders the datacenter country codes.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_countries(
    countries: &[String],
    format: OutputFormat,
) -> Result<String, DisplayError> {
    match format {
        OutputFormat::Json => to_json(countries),
        OutputFormat::Compact => Ok(format!(
            "Available country codes: {}\n",
            countries.join(", ")
        )),
        OutputFormat::Table => {
            let mut table = table_with_header(&["#", "Country Code"]);
            for (index, country) in countries.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(index + 1),
                    Cell::new(country).fg(Color::Green),
                ]);
            }
            Ok(format!("{table}\n"))
        }
    }
}

/// Renders the hardware catalogue as CPU, memory, and storage sections.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_hardware(
    hardware: &HardwareOptions,
    format: OutputFormat,
) -> Result<String, DisplayError> {
    if format.is_json() {
        return to_json(hardware);
    }
    let cpu = hardware
        .cpu
        .iter()
        .map(|option| format!("{} {}", option.manufacturer, option.architecture));
    let memory = hardware
        .memory
        .iter()
        .map(|option| format!("{} {}", option.kind, option.generation));
    let storage = hardware.storage.iter().map(|option| option.kind.clone());

    Ok([
        section("CPU Options:", cpu),
        section("Memory Options:", memory),
        section("Storage Options:", storage),
    ]
    .concat())
}

fn section(title: &str, items: impl Iterator<Item = String>) -> String {
    let mut lines = vec![format!("{title}\n")];
    lines.extend(items.map(|item| format!("  - {}\n", item.trim())));
    lines.push(String::from("\n"));
    lines.concat()
}

/// Renders marketplace offers.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_offers(offers: &[Offer], format: OutputFormat) -> Result<String, DisplayError> {
    let price = |offer: &Offer| {
        offer
            .configuration
            .price
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    };
    let location = |offer: &Offer| {
        offer
            .datacenter
            .as_ref()
            .map(|dc| dc.label())
            .unwrap_or_default()
    };
    match format {
        OutputFormat::Json => to_json(offers),
        OutputFormat::Compact => Ok(offers
            .iter()
            .map(|offer| {
                format!(
                    "{} - {} - {} - {} available\n",
                    offer.configuration.slug,
                    or_dash(&price(offer)),
                    or_dash(&location(offer)),
                    offer.available_instances()
                )
            })
            .collect()),
        OutputFormat::Table => {
            let mut table =
                table_with_header(&["Configuration", "Price", "Datacenter", "Available"]);
            for offer in offers {
                table.add_row(vec![
                    Cell::new(&offer.configuration.slug).fg(Color::Green),
                    Cell::new(or_dash(&price(offer))).fg(Color::Yellow),
                    Cell::new(or_dash(&location(offer))),
                    Cell::new(offer.available_instances()),
                ]);
            }
            Ok(format!("{table}\n"))
        }
    }
}

/// Renders the standard basic configurations.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_configurations(
    configurations: &[BasicConfiguration],
    format: OutputFormat,
) -> Result<String, DisplayError> {
    match format {
        OutputFormat::Json => {
            let slugs: Vec<String> = configurations.iter().map(ToString::to_string).collect();
            to_json(&slugs)
        }
        OutputFormat::Compact => Ok(configurations
            .iter()
            .map(|configuration| format!("{configuration}\n"))
            .collect()),
        OutputFormat::Table => {
            let mut table =
                table_with_header(&["Configuration", "CPU", "RAM (GB)", "Storage (GB)"]);
            for configuration in configurations {
                table.add_row(vec![
                    Cell::new(configuration).fg(Color::Green),
                    Cell::new(configuration.cpu),
                    Cell::new(configuration.ram_gb),
                    Cell::new(configuration.storage_gb),
                ]);
            }
            Ok(format!("{table}\n"))
        }
    }
}

/// Renders a price estimate.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_estimate(estimate: &Estimate, format: OutputFormat) -> Result<String, DisplayError> {
    if format.is_json() {
        return to_json(estimate);
    }
    let Some(daily) = estimate.daily() else {
        return Ok(String::from("No pricing information available\n"));
    };
    let mut lines = vec![format!("Daily price: ${daily}\n")];
    if let Some(hourly) = estimate.hourly() {
        lines.push(format!("Hourly price: ${hourly:.6}\n"));
    }
    if let Some(monthly) = estimate.monthly() {
        lines.push(format!("Monthly price (30 days): ${monthly:.2}\n"));
    }
    if let Some(deposit) = &estimate.deposit_amount_usdc {
        let epochs = estimate
            .deposit_epochs
            .map(|count| format!(" ({count} epochs)"))
            .unwrap_or_default();
        lines.push(format!("Deposit: {deposit} USDC{epochs}\n"));
    }
    Ok(lines.concat())
}
