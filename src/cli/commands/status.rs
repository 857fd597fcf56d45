//! Status command - list cache stores and the controlling version

use crate::agent::{ClientRegistry, DiskClientRegistry};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::{Config, ConfigManager};
use crate::error::ShellkeepResult;
use crate::store::{CacheBackend, CacheStore as _, DiskBackend};
use crate::ui::format_bytes;
use console::style;

struct StoreRow {
    name: String,
    entries: usize,
    bytes: u64,
    current: bool,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> ShellkeepResult<()> {
    let backend = DiskBackend::new(ConfigManager::stores_dir(config));
    let clients = DiskClientRegistry::new(ConfigManager::claim_marker_path(config));

    let names = backend.store_names().await?;
    if names.is_empty() {
        println!("No cache stores found.");
        return Ok(());
    }

    let controller = clients.controller().await?;
    let current_name = controller
        .as_ref()
        .map(|version| format!("{}-{}", config.app.name, version));

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let store = backend.open(&name).await?;
        rows.push(StoreRow {
            entries: store.entry_count().await?,
            bytes: store.total_bytes().await?,
            current: current_name.as_deref() == Some(name.as_str()),
            name,
        });
    }

    match args.format {
        OutputFormat::Table => print_table(&rows, controller.as_deref()),
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Plain => print_plain(&rows),
    }

    Ok(())
}

fn print_table(rows: &[StoreRow], controller: Option<&str>) {
    println!("{:<40} {:>8} {:>10} {:<10}", "STORE", "ENTRIES", "SIZE", "STATE");
    println!("{}", "-".repeat(72));

    for row in rows {
        let state = if row.current {
            style("current").green().to_string()
        } else {
            style("stale").yellow().to_string()
        };
        println!(
            "{:<40} {:>8} {:>10} {:<10}",
            row.name,
            row.entries,
            format_bytes(row.bytes),
            state
        );
    }

    println!();
    match controller {
        Some(version) => println!("Controlling version: {}", version),
        None => println!("Controlling version: none (run: shellkeep activate)"),
    }
    println!("Total: {} store(s)", rows.len());
}

fn print_json(rows: &[StoreRow]) -> ShellkeepResult<()> {
    #[derive(serde::Serialize)]
    struct StoreJson<'a> {
        name: &'a str,
        entries: usize,
        bytes: u64,
        current: bool,
    }

    let json_rows: Vec<StoreJson<'_>> = rows
        .iter()
        .map(|row| StoreJson {
            name: &row.name,
            entries: row.entries,
            bytes: row.bytes,
            current: row.current,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_rows)?);
    Ok(())
}

fn print_plain(rows: &[StoreRow]) {
    for row in rows {
        println!("{}", row.name);
    }
}
