//! Rendering of API results for the terminal.
//!
//! Every renderer returns the text to print so callers decide where it goes;
//! JSON output is pretty printed and contains nothing but the payload.

mod account;
mod market;
mod vm;

use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use thiserror::Error;

pub use account::{render_config_summary, render_ssh_keys};
pub use market::{
    render_configurations, render_countries, render_estimate, render_hardware, render_images,
    render_offers,
};
pub use vm::{
    needs_full_id_hint, render_created, render_vm_details, render_vm_list, truncate_id,
};

/// IDs longer than this are shortened in tables unless `--full-id` is set.
pub const MAX_ID_WIDTH: usize = 16;

/// How results are printed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// Human readable tables.
    #[default]
    Table,
    /// Pretty printed JSON.
    Json,
    /// One line per record.
    Compact,
}

impl OutputFormat {
    /// Whether output must stay machine readable.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Errors raised while rendering output.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Serialisation to JSON failed.
    #[error("failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pretty prints `value` as JSON.
///
/// # Errors
///
/// Returns [`DisplayError::Json`] when serialisation fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DisplayError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn table_with_header(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|column| Cell::new(column).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn status_color(status: &str) -> Color {
    match status.to_ascii_lowercase().as_str() {
        "active" => Color::Green,
        "terminated" | "failed" | "stopped" => Color::Red,
        _ => Color::Yellow,
    }
}

fn status_colored(status: &str) -> ColoredString {
    match status_color(status) {
        Color::Green => status.green(),
        Color::Red => status.red(),
        _ => status.yellow(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}
