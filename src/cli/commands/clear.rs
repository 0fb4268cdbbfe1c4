//! Maintenance commands - clear and purge pools

use super::ensure_persisted;
use crate::cli::args::PoolArgs;
use crate::error::CacheResult;
use crate::manager::{CacheManagerExt, FilesystemCacheManager};
use console::style;

/// Execute the clear command
pub fn clear(args: PoolArgs, manager: &mut FilesystemCacheManager) -> CacheResult<()> {
    let pool = manager.pool(&args.pool)?;
    let cleared = pool.borrow_mut().clear();
    ensure_persisted(cleared, &args.pool)?;

    println!("{} Cleared pool {}", style("[OK]").green(), args.pool);
    Ok(())
}

/// Execute the purge command
pub fn purge(args: PoolArgs, manager: &mut FilesystemCacheManager) -> CacheResult<()> {
    let pool = manager.pool(&args.pool)?;
    let mut pool = pool.borrow_mut();

    let removed = pool.purge_expired();
    if removed > 0 {
        // Nothing is staged, so this only rewrites the file
        ensure_persisted(pool.commit(), &args.pool)?;
    }

    println!(
        "{} Removed {} expired entr{} from {}",
        style("[OK]").green(),
        removed,
        if removed == 1 { "y" } else { "ies" },
        args.pool
    );
    Ok(())
}
