//! INI profile CLI commands.
//!
//! Games keep per-user settings in small INI files. These commands read and
//! write them with the same rules the engine uses: a missing key reads as
//! the supplied default, and writes create the file and section on demand.

use std::path::PathBuf;

use assetfs::profile::{get_string, write_string};
use clap::Subcommand;

use crate::error::CliError;

/// Profile subcommands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// Print a value, or the default when it is missing
    Get {
        /// Profile file
        file: PathBuf,

        /// Section name (empty for keys outside any section)
        section: String,

        /// Key name
        key: String,

        /// Value printed when the key is absent
        #[arg(long, default_value = "")]
        default: String,
    },

    /// Set a value
    Set {
        /// Profile file
        file: PathBuf,

        /// Section name (empty for keys outside any section)
        section: String,

        /// Key name
        key: String,

        /// Value to store
        value: String,
    },
}

/// Run a profile subcommand.
pub fn run(command: ProfileCommands) -> Result<(), CliError> {
    match command {
        ProfileCommands::Get {
            file,
            section,
            key,
            default,
        } => {
            println!("{}", get_string(&section, &key, &default, &file));
            Ok(())
        }
        ProfileCommands::Set {
            file,
            section,
            key,
            value,
        } => {
            write_string(&section, &key, &value, &file)?;
            println!("Set [{}] {} = {}", section, key, value);
            Ok(())
        }
    }
}
