//! Output formatting utilities

use anyhow::Result;
use colored::*;
use lca_engine::EngineConfig;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Human-readable tables
    Table,
}

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print rows as a table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No results".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("\n{}", title.bold());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn print_config(config: &EngineConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            println!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

/// Format an impact value: fixed-point for everyday magnitudes, scientific
/// for very small or very large ones.
pub fn fmt_value(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && !(1e-3..1e6).contains(&magnitude) {
        format!("{:.3e}", value)
    } else {
        format!("{:.4}", value)
    }
}

pub fn fmt_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(0.0), "0.0000");
        assert_eq!(fmt_value(2.5), "2.5000");
        assert_eq!(fmt_value(4.0e-7), "4.000e-7");
        assert_eq!(fmt_value(2.5e7), "2.500e7");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(0.256), "25.6%");
    }
}
