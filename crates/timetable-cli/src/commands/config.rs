//! `timetable config`: read and edit `config.toml` by dotted key.

use clap::Subcommand;
use timetable_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dotted key (e.g. "reminders.max_batch", "reminders.user_name")
        key: String,
    },
    /// Change one setting; the value is parsed as the key's existing type
    Set {
        /// Dotted key (e.g. "reminders.enabled", "logging.level")
        key: String,
        value: String,
    },
    /// Print the whole configuration as JSON
    List,
    /// Overwrite config.toml with the built-in defaults
    Reset,
    /// Print where config.toml lives
    Path,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("no such setting: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
            if key.starts_with("reminders.") {
                eprintln!("run `timetable reminders sync` to apply it to pending reminders");
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("defaults written to {}", Config::path()?.display());
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
    }
    Ok(())
}
