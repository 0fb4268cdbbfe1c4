//! memocache - cache pool maintenance tool
//!
//! CLI entry point that dispatches to subcommands.

use clap::{CommandFactory, Parser};
use console::style;
use memocache::cli::{commands, Cli, Commands};
use memocache::config::ConfigManager;
use memocache::error::CacheResult;
use memocache::manager::FilesystemCacheManager;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("memocache=warn"),
        1 => EnvFilter::new("memocache=info"),
        _ => EnvFilter::new("memocache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(args.shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let mut config = config_manager.load()?;
    if let Some(dir) = cli.dir {
        debug!("Pool directory overridden: {}", dir.display());
        config.set_directory(dir);
    }

    if let Commands::Config(args) = cli.command {
        return commands::config(args, &config_manager, &config);
    }

    let mut manager = FilesystemCacheManager::new(config);

    match cli.command {
        Commands::Completions(_) | Commands::Config(_) => unreachable!("handled above"),
        Commands::List(args) => commands::list(args, &manager),
        Commands::Show(args) => commands::show(args, &mut manager),
        Commands::Get(args) => commands::get(args, &mut manager),
        Commands::Set(args) => commands::set(args, &mut manager),
        Commands::Delete(args) => commands::delete(args, &mut manager),
        Commands::Clear(args) => commands::clear(args, &mut manager),
        Commands::Purge(args) => commands::purge(args, &mut manager),
    }
}
