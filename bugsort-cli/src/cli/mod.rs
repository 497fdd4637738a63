//! Command-line interface

pub mod commands;
pub mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::session::SessionError;
use commands::config::ConfigCommands;
use commands::inspect::InspectCommands;
use commands::sort::SortCommands;

#[derive(Parser)]
#[command(name = "bugsort")]
#[command(about = "Sort the \"Bugs Reported\" sheet of an Excel workbook by type, priority and report date")]
#[command(version)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sort workbooks and save `<name>_sorted.xlsx` next to them
    Sort(SortCommands),

    /// Show sheets, columns and resolved bindings without writing anything
    Inspect(InspectCommands),

    /// Show where the config file lives or what it resolves to
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// A session error that has already been shown to the user
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Reported(#[from] pub SessionError);

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Sort(args) => commands::sort::handle_sort_command(args, &config).await,
        Commands::Inspect(args) => commands::inspect::handle_inspect_command(args, &config).await,
        Commands::Config(args) => {
            commands::config::handle_config_command(args, cli.config.as_deref(), &config)
        }
    }
}
