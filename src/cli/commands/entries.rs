//! Entry commands - get, set and delete single keys

use super::ensure_persisted;
use crate::cli::args::{parse_value, DeleteArgs, GetArgs, SetArgs};
use crate::error::CacheResult;
use crate::manager::{CacheManagerExt, FilesystemCacheManager};
use console::style;
use tracing::info;

/// Execute the get command
pub fn get(args: GetArgs, manager: &mut FilesystemCacheManager) -> CacheResult<()> {
    let pool = manager.pool(&args.pool)?;
    let item = pool.borrow_mut().get_item(&args.key)?;

    match item.get().filter(|_| item.is_hit()) {
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None => eprintln!("{} {}", style("miss:").yellow(), args.key),
    }
    Ok(())
}

/// Execute the set command
pub fn set(args: SetArgs, manager: &mut FilesystemCacheManager) -> CacheResult<()> {
    let pool = manager.pool(&args.pool)?;
    let mut pool = pool.borrow_mut();

    let mut item = pool.get_item(&args.key)?;
    item.set(parse_value(&args.value));
    match args.ttl {
        Some(seconds) => item.expires_after_secs(seconds),
        None => item.expires_at(None),
    };

    ensure_persisted(pool.save(&item), &args.pool)?;
    info!("Stored {} in pool {}", args.key, args.pool);
    println!("{} {}", style("[OK]").green(), args.key);
    Ok(())
}

/// Execute the delete command
pub fn delete(args: DeleteArgs, manager: &mut FilesystemCacheManager) -> CacheResult<()> {
    let pool = manager.pool(&args.pool)?;
    let keys: Vec<&str> = args.keys.iter().map(String::as_str).collect();

    let persisted = pool.borrow_mut().delete_items(&keys)?;
    ensure_persisted(persisted, &args.pool)?;

    println!(
        "{} Deleted {} key(s) from {}",
        style("[OK]").green(),
        keys.len(),
        args.pool
    );
    Ok(())
}
