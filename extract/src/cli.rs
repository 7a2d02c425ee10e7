//! The command-line arguments and configuration system for the `typedb` binary.

use clap::{Parser, Subcommand};
use config::FileFormat::Toml;
use directories::ProjectDirs;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use typedb_core::config::Config;

/// Command-line arguments for the `typedb` binary.
#[derive(Debug, Parser)]
#[command(name = "typedb", about = "Extract C/C++ type definitions into a type database")]
pub struct Args {
    /// Set a configuration value; format $NAME=$VALUE.
    #[arg(long, short, global = true)]
    pub config: Vec<String>,

    /// Prints out the location of the config file.
    #[arg(long, global = true)]
    pub print_config_path: bool,

    /// Log at debug level, overriding the configured filter.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    // Should always be present unless using a flag like --print-config-path
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a type database from an AST snapshot.
    Extract {
        /// Path to the AST snapshot (JSON).
        input: Option<PathBuf>,

        /// Path the type database is written to.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a type database in human-readable form.
    Dump {
        /// Path to the type database.
        database: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no home directory")]
    NoHomeDirectory,
    #[error("failed to parse config value {0:?}; no '=' found")]
    MalformedOverride(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

/// Prints out a warning message for every field in `unknown`.
///
/// `prefix` should be the path to the table holding these entries, or `""` for the top level.
pub(crate) fn unknown_field_warning(prefix: &str, unknown: &HashMap<String, Value>) {
    let mut entries: Vec<_> = unknown.keys().collect();
    entries.sort_unstable();
    entries.into_iter().for_each(|name| match prefix {
        "" => eprintln!("Warning: unknown config key {name}"),
        p => eprintln!("Warning: unknown config key {p}.{name}"),
    });
}

/// Performs parsing and validation of the config; to be called by main() before executing any code
/// that tries to retrieve the config.
///
/// Returns the config, or None if a command line flag that calls for an early exit (such as
/// --print-config-path) was provided.
pub fn initialize(args: &Args) -> Result<Option<Config>, CliError> {
    let dirs = ProjectDirs::from("", "", "typedb").ok_or(CliError::NoHomeDirectory)?;
    if args.print_config_path {
        println!("Config file location: {:?}", config_file(dirs.config_dir()));
        return Ok(None);
    }
    let config = load_config(args, dirs.config_dir())?;
    unknown_field_warning("", &config.unknown);
    Ok(Some(config))
}

fn load_config(args: &Args, config_dir: &Path) -> Result<Config, CliError> {
    let mut settings = config::Config::builder()
        .add_source(config::File::from_str(
            include_str!("../default_config.toml"),
            Toml,
        ))
        .add_source(config::File::from(config_file(config_dir)).required(false))
        .add_source(config::File::from(PathBuf::from("typedb.toml")).required(false));
    for config_arg in &args.config {
        let Some((name, value)) = config_arg.split_once('=') else {
            return Err(CliError::MalformedOverride(config_arg.clone()));
        };
        settings = settings.set_override(name, value)?;
    }

    let mut config: Config = settings.build()?.try_deserialize()?;
    // Paths are assigned after deserialization; the config crate cannot hold a Path losslessly.
    if let Some(Command::Extract { input, output }) = &args.command {
        if let Some(input) = input {
            config.input = input.clone();
        }
        if let Some(output) = output {
            config.output = output.clone();
        }
    }
    Ok(config)
}

/// Returns the config file path, given the config directory.
fn config_file(config_dir: &Path) -> PathBuf {
    [config_dir, "typedb.toml".as_ref()].iter().collect()
}
