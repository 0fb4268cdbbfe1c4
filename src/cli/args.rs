//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// memocache - inspect and maintain cache pools
///
/// Reads the pool files written by applications using the memocache
/// library: list pools, look at entries, drop stale data.
#[derive(Parser, Debug)]
#[command(name = "memocache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MEMOCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pool directory, overrides the configured one
    #[arg(short, long, global = true, env = "MEMOCACHE_DIR")]
    pub dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List pool files in the cache directory
    List(ListArgs),

    /// Show the live entries of a pool
    Show(ShowArgs),

    /// Print the value stored under a key
    Get(GetArgs),

    /// Store a value under a key
    Set(SetArgs),

    /// Delete one or more keys from a pool
    Delete(DeleteArgs),

    /// Remove all entries of a pool
    Clear(PoolArgs),

    /// Drop expired entries of a pool and rewrite it
    Purge(PoolArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// One item per line
    Plain,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Pool name
    pub pool: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments naming a single pool
#[derive(Parser, Debug)]
pub struct PoolArgs {
    /// Pool name
    pub pool: String,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Pool name
    pub pool: String,

    /// Cache key
    pub key: String,
}

/// Arguments for the set command
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Pool name
    pub pool: String,

    /// Cache key
    pub key: String,

    /// Value; parsed as JSON, stored as a string if that fails
    pub value: String,

    /// Expire after this many seconds, negative = already expired
    /// (default: from config)
    #[arg(long, allow_negative_numbers = true)]
    pub ttl: Option<i64>,
}

/// Arguments for the delete command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Pool name
    pub pool: String,

    /// Keys to delete
    #[arg(required = true)]
    pub keys: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

/// Parse a command-line value as JSON, falling back to a plain string
pub fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
