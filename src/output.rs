//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of rows in the selected format
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single row in the selected format
pub fn print_item<T: Serialize + Tabled>(row: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new(std::iter::once(row))),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(row).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print any serializable value as JSON, or as debug output for tables
pub fn print_value<T: Serialize + std::fmt::Debug>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{value:#?}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

/// Render an optional timestamp or a dash
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
