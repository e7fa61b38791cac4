//! AssetFS CLI - Command-line interface
//!
//! Mounts a game's asset set (loose directories and encrypted archives) and
//! lets you inspect it the way the engine sees it: list the merged tree,
//! resolve extensionless names, dump files, and inspect the font set.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::profile::ProfileCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "assetfs")]
#[command(version, about = "Inspect and resolve game asset sets", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Configuration file (defaults to the per-user config.ini if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory or archive to mount; repeat to mount several, earliest wins
    #[arg(short, long = "mount", global = true, value_name = "PATH")]
    pub mounts: Vec<PathBuf>,

    /// Resolve names case-sensitively against the live mounts
    #[arg(long, global = true)]
    pub no_path_cache: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List mounted sources in search order
    Mounts,

    /// Walk the merged directory tree
    Ls {
        /// Directory to list (root if omitted)
        dir: Option<String>,

        /// Maximum depth to descend (0 lists only direct children)
        #[arg(long)]
        depth: Option<usize>,

        /// Only print files
        #[arg(long)]
        files: bool,
    },

    /// Resolve a name without extension to the file the engine would load
    Resolve {
        /// Virtual path, e.g. Graphics/Titles/Title
        name: String,

        /// Extension to accept; other candidates are rejected
        #[arg(long)]
        ext: Vec<String>,
    },

    /// Write a file's contents to stdout
    Cat {
        /// Virtual path; resolved like `resolve` unless --raw is given
        name: String,

        /// Open the exact path, without extension discovery
        #[arg(long)]
        raw: bool,
    },

    /// Check whether an exact path exists in any mount
    Exists {
        /// Virtual path including extension
        name: String,
    },

    /// List the fonts the engine would register
    Fonts,

    /// Read or write INI profile values
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Mounts => commands::inspect::run_mounts(&cli.global),
        Commands::Ls { dir, depth, files } => {
            commands::inspect::run_ls(&cli.global, dir.as_deref().unwrap_or(""), depth, files)
        }
        Commands::Resolve { name, ext } => commands::read::run_resolve(&cli.global, &name, &ext),
        Commands::Cat { name, raw } => commands::read::run_cat(&cli.global, &name, raw),
        Commands::Exists { name } => commands::inspect::run_exists(&cli.global, &name),
        Commands::Fonts => commands::inspect::run_fonts(&cli.global),
        Commands::Profile { command } => commands::profile::run(command),
        Commands::Config { command } => commands::config::run(&cli.global, command),
    }
}
