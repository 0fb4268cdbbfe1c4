//! List command - show the pool files in the cache directory

use crate::cli::args::{ListArgs, OutputFormat};
use crate::error::CacheResult;
use crate::manager::FilesystemCacheManager;
use crate::pool::filesystem::modified_time;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use tracing::debug;

/// Summary of one pool file
#[derive(Debug, Serialize)]
struct PoolSummary {
    name: String,
    /// Live entries, `None` if the file could not be read
    entries: Option<usize>,
    size: u64,
    modified: Option<DateTime<Utc>>,
}

/// Execute the list command
pub fn execute(args: ListArgs, manager: &FilesystemCacheManager) -> CacheResult<()> {
    let names = manager.stored_pools()?;

    if names.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!(
                "No pools found in {}",
                manager.directory().display()
            ),
        }
        return Ok(());
    }

    let summaries: Vec<PoolSummary> = names
        .into_iter()
        .map(|name| summarize(manager, name))
        .collect();

    match args.format {
        OutputFormat::Table => print_table(&summaries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Plain => summaries.iter().for_each(|s| println!("{}", s.name)),
    }

    Ok(())
}

fn summarize(manager: &FilesystemCacheManager, name: String) -> PoolSummary {
    let path = manager.directory().join(&name);
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let modified = modified_time(&path).map(DateTime::<Utc>::from);

    let entries = match manager.peek_pool(&name) {
        Ok(entries) => Some(entries.values().filter(|e| !e.is_expired()).count()),
        Err(e) => {
            debug!("Skipping unreadable pool {}: {}", name, e);
            None
        }
    };

    PoolSummary {
        name,
        entries,
        size,
        modified,
    }
}

fn print_table(summaries: &[PoolSummary]) {
    println!(
        "{:<30} {:>8} {:>10}  {:<20}",
        style("POOL").bold(),
        style("ENTRIES").bold(),
        style("BYTES").bold(),
        style("MODIFIED").bold()
    );
    println!("{}", "-".repeat(72));

    for summary in summaries {
        let entries = match summary.entries {
            Some(count) => count.to_string(),
            None => style("unreadable").red().to_string(),
        };
        let modified = summary
            .modified
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        println!(
            "{:<30} {:>8} {:>10}  {:<20}",
            summary.name, entries, summary.size, modified
        );
    }

    println!();
    println!("Total: {} pool(s)", summaries.len());
}
