//! VM listings and details.

use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::{
    DisplayError, MAX_ID_WIDTH, OutputFormat, or_dash, status_color, status_colored,
    table_with_header, to_json,
};
use crate::api::types::{CreatedVm, Vm};

const ID_EDGE: usize = 6;

/// Shortens long IDs to their first and last six characters.
#[must_use]
pub fn truncate_id(id: &str, full: bool) -> String {
    let chars: Vec<char> = id.chars().collect();
    if full || chars.len() <= MAX_ID_WIDTH {
        return id.to_owned();
    }
    let head: String = chars.iter().take(ID_EDGE).collect();
    let tail: String = chars.iter().skip(chars.len() - ID_EDGE).collect();
    format!("{head}...{tail}")
}

/// Whether any ID in `vms` would be shortened.
#[must_use]
pub fn needs_full_id_hint(vms: &[Vm], full: bool) -> bool {
    !full && vms.iter().any(|vm| vm.id.chars().count() > MAX_ID_WIDTH)
}

/// Renders a list of VMs.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_vm_list(
    vms: &[Vm],
    format: OutputFormat,
    full_id: bool,
) -> Result<String, DisplayError> {
    match format {
        OutputFormat::Json => to_json(vms),
        OutputFormat::Compact => Ok(vms
            .iter()
            .enumerate()
            .map(|(index, vm)| {
                let name = if vm.name().is_empty() { "Unnamed" } else { vm.name() };
                format!(
                    "{}. {} - {} - {name}\n",
                    index + 1,
                    truncate_id(&vm.id, full_id),
                    status_colored(&vm.status)
                )
            })
            .collect()),
        OutputFormat::Table => {
            let mut table = table_with_header(&[
                "ID",
                "Name",
                "Status",
                "IP Address",
                "CPU",
                "Memory",
                "Region",
            ]);
            for vm in vms {
                table.add_row(vec![
                    Cell::new(truncate_id(&vm.id, full_id)),
                    Cell::new(vm.name()).fg(Color::Green),
                    Cell::new(&vm.status).fg(status_color(&vm.status)),
                    Cell::new(or_dash(vm.public_ip.as_deref().unwrap_or_default())),
                    Cell::new(vm.cpu_count()),
                    Cell::new(format!("{} GB", vm.memory_gb())),
                    Cell::new(or_dash(vm.region())),
                ]);
            }
            Ok(format!("{table}\n"))
        }
    }
}

/// Renders the VMs returned by a create request.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_created(created: &[CreatedVm], format: OutputFormat) -> Result<String, DisplayError> {
    if format.is_json() {
        return to_json(created);
    }
    Ok(created
        .iter()
        .map(|vm| {
            format!(
                "VM ID: {}\nVM Name: {}\n",
                vm.vm_id,
                or_dash(vm.vm_name.as_deref().unwrap_or_default())
            )
        })
        .collect())
}

/// Renders a single VM.
///
/// # Errors
///
/// Returns [`DisplayError`] when JSON rendering fails.
pub fn render_vm_details(vm: &Vm, format: OutputFormat) -> Result<String, DisplayError> {
    match format {
        OutputFormat::Json => to_json(vm),
        OutputFormat::Compact => Ok(format!(
            "{} - {} - {} - {}\n",
            vm.id,
            status_colored(&vm.status),
            or_dash(vm.name()),
            or_dash(vm.public_ip.as_deref().unwrap_or_default())
        )),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            let price = vm
                .price_per_epoch
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let spent = vm
                .total_spent
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let datacenter = vm
                .datacenter
                .as_ref()
                .map(|dc| dc.label())
                .unwrap_or_default();
            let rows = [
                ("ID", vm.id.clone()),
                ("Name", vm.name().to_owned()),
                ("Status", vm.status.clone()),
                ("IP Address", vm.public_ip.clone().unwrap_or_default()),
                ("CPU", vm.cpu_count().to_string()),
                ("Memory", format!("{} GB", vm.memory_gb())),
                ("Storage", format!("{} GB", vm.storage_gb())),
                ("Region", vm.region().to_owned()),
                ("Datacenter", datacenter),
                ("OS Image", vm.os_image.clone().unwrap_or_default()),
                ("Open Ports", vm.ports_label()),
                ("Created At", vm.created_at.clone().unwrap_or_default()),
                ("Next Billing", vm.next_billing_at.clone().unwrap_or_default()),
                ("Price Per Epoch", price),
                ("Total Spent", spent),
            ];
            for (label, value) in rows {
                let value_cell = if label == "Status" {
                    Cell::new(&value).fg(status_color(&value))
                } else {
                    Cell::new(or_dash(&value)).fg(Color::Yellow)
                };
                table.add_row(vec![Cell::new(label).fg(Color::Green), value_cell]);
            }
            Ok(format!("{table}\n"))
        }
    }
}
