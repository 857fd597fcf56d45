//! Output functions for consistent CLI formatting

use console::style;

/// Display a success step
pub fn step_ok(message: &str) {
    println!("  {} {}", style("✓").green(), message);
}

/// Display a warning step
pub fn step_warn(message: &str) {
    println!("  {} {}", style("!").yellow(), message);
}

/// Display an error step
pub fn step_error(message: &str) {
    println!("  {} {}", style("✗").red(), message);
}

/// Display an info step
pub fn step_info(message: &str) {
    println!("  {} {}", style("•").cyan(), message);
}

/// Print a styled key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
