//! Show command - print the live entries of a pool

use super::preview;
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::error::CacheResult;
use crate::item::CacheItem;
use crate::manager::{CacheManagerExt, FilesystemCacheManager};
use crate::pool::CacheItemPoolExt;
use console::style;
use serde_json::{json, Map, Value};

/// Execute the show command
pub fn execute(args: ShowArgs, manager: &mut FilesystemCacheManager) -> CacheResult<()> {
    let pool = manager.pool(&args.pool)?;
    let mut pool = pool.borrow_mut();

    let keys = pool.keys();
    let items: Vec<CacheItem> = pool
        .get_items(&keys)
        .map(|found| found.map(|(_, item)| item))
        .collect::<CacheResult<_>>()?;

    match args.format {
        OutputFormat::Table => print_table(&args.pool, &items),
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Plain => items.iter().for_each(|item| println!("{}", item.key())),
    }

    Ok(())
}

fn print_table(pool: &str, items: &[CacheItem]) {
    if items.is_empty() {
        println!("Pool {} is empty", style(pool).cyan());
        return;
    }

    println!(
        "{:<30} {:<20} {}",
        style("KEY").bold(),
        style("EXPIRES").bold(),
        style("VALUE").bold()
    );
    println!("{}", "-".repeat(80));

    for item in items {
        let expires = item
            .expiration()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| style("never").dim().to_string());
        let value = item.get().map(|v| preview(v, 40)).unwrap_or_default();

        println!("{:<30} {:<20} {}", item.key(), expires, value);
    }

    println!();
    println!("Total: {} entr{}", items.len(), if items.len() == 1 { "y" } else { "ies" });
}

fn print_json(items: &[CacheItem]) -> CacheResult<()> {
    let map: Map<String, Value> = items
        .iter()
        .map(|item| {
            let entry = json!({
                "value": item.get().cloned().unwrap_or(Value::Null),
                "expires": item.expiration().map(|at| at.to_rfc3339()),
            });
            (item.key().to_string(), entry)
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}
