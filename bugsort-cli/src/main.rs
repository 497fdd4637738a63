mod cli;
mod config;
mod session;
mod sorting;
mod workbook;

use clap::Parser;
use colored::*;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            init_logging(&Config::default(), cli.verbose);
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };
    init_logging(&config, cli.verbose);

    if let Err(err) = cli::run(cli, config).await {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

/// Config level first, then `RUST_LOG`, then `-v` flags
fn init_logging(config: &Config, verbose: u8) {
    let configured = config
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(configured);
    builder.parse_default_env();

    let verbosity = match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };
    if let Some(level) = verbosity {
        builder.filter_level(level);
    }

    builder.init();
}
