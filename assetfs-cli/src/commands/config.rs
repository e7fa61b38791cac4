//! Configuration CLI commands.

use assetfs::{default_config_path, VfsConfig};
use clap::Subcommand;

use crate::error::CliError;
use crate::runner::resolve_config;
use crate::GlobalArgs;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration after applying CLI options
    Show,

    /// Show the default configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(args: &GlobalArgs, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            let config = resolve_config(args)?;
            print!("{}", render(&config));
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", default_config_path().display());
            Ok(())
        }
    }
}

/// Render a configuration in the INI layout `VfsConfig::load` reads.
pub fn render(config: &VfsConfig) -> String {
    let mut out = String::from("[filesystem]\n");
    out.push_str(&format!("allow_symlinks = {}\n", config.allow_symlinks));
    out.push_str(&format!("path_cache = {}\n", config.path_cache));
    out.push_str(&format!("unicode_nfc = {}\n", nfc_value(config)));
    if let Some(dir) = &config.write_dir {
        out.push_str(&format!("write_dir = {}\n", dir.display()));
    }

    out.push_str("\n[mounts]\n");
    for (index, mount) in config.mounts.iter().enumerate() {
        out.push_str(&format!("mount{} = {}\n", index + 1, mount.display()));
    }
    out
}

fn nfc_value(config: &VfsConfig) -> &'static str {
    match config.normalization {
        assetfs::NameNormalization::Preserve => "false",
        assetfs::NameNormalization::Nfc => "true",
        assetfs::NameNormalization::Platform => "auto",
    }
}
