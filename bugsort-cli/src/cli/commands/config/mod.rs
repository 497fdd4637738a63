//! `bugsort config`

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,
    /// Print the effective settings as TOML
    Show,
}

pub fn handle_config_command(
    command: ConfigCommands,
    explicit: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let path = config_location(explicit);

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let origin = if path.exists() {
                path.display().to_string()
            } else {
                format!("{} (not found, using defaults)", path.display())
            };
            println!("{}", format!("# {}", origin).dimmed());
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn config_location(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}
