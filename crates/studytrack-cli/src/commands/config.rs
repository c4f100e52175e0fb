//! Configuration management commands.

use std::error::Error;

use clap::Subcommand;
use studytrack_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Read a configuration value
    Get {
        /// Dotted key, e.g. study.default_goal_hours
        key: String,
    },
    /// Set a configuration value
    Set {
        key: String,
        value: String,
    },
    /// Print the whole configuration
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let config = Config::load();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
