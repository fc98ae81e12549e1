//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, `config path`, and
//! `config init` for viewing and modifying `~/.panohunter/config.ini` from
//! the command line.

use clap::Subcommand;
use panohunter::config::{config_file_path, ConfigFile, ConfigKey};

use super::common::mask_key;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., search.step_km)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., search.step_km)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,

    /// Create the configuration file with default values
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'panohunter config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load()?;
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save()?;

    if config_key.is_secret() {
        println!("Set {} = {}", config_key.name(), mask_key(value));
    } else {
        println!("Set {} = {}", config_key.name(), value);
    }

    Ok(())
}

/// List all configuration settings.
fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(&config);
        let key_name = key.key_name();

        if value.is_empty() {
            println!("  {} = (not set)", key_name);
        } else if key.is_secret() {
            println!("  {} = {}", key_name, mask_key(&value));
        } else {
            println!("  {} = {}", key_name, value);
        }
    }

    Ok(())
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Create the configuration file if it doesn't exist yet.
fn run_init() -> Result<(), CliError> {
    let existed = config_file_path().exists();
    let path = ConfigFile::ensure_exists()?;

    if existed {
        println!("Configuration already exists at {}", path.display());
    } else {
        println!("Created {}", path.display());
        println!();
        println!("Next step: panohunter config set api.key <YOUR_KEY>");
    }

    Ok(())
}
