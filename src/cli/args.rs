//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shellkeep - versioned offline cache for single-page app shells
///
/// Populates a versioned cache store from a static resource manifest,
/// prunes stale versions on activation, and serves intercepted requests
/// from the cache.
#[derive(Parser, Debug)]
#[command(name = "shellkeep")]
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
    #[arg(short, long, global = true, env = "SHELLKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local shellkeep.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a project-local shellkeep.toml config
    Init(InitArgs),

    /// Populate the versioned cache store from the manifest
    Install(InstallArgs),

    /// Prune stale store versions and claim control
    Activate,

    /// Serve one request through the cache agent
    Fetch(FetchArgs),

    /// Show cache stores and the controlling version
    Status(StatusArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing shellkeep.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Populate from a local build-output directory instead of the origin
    #[arg(long, value_name = "DIR")]
    pub from: Option<PathBuf>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL path to request
    pub url: String,

    /// Treat the request as a top-level navigation
    #[arg(long)]
    pub navigate: bool,

    /// Write the response body to a file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config action
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table
    Table,
    /// JSON array
    Json,
    /// One name per line
    Plain,
}
