//! vidgrab command line front end.
//!
//! Builds the main window on the headless toolkit, replays the requested
//! actions through the presenter, and prints the resulting widget tree.

use anyhow::Context;
use clap::Parser;
use vidgrab::cli::{self, Cli};
use vidgrab::logging::{self, LOG_ENV, targets};
use vidgrab::{Config, LogBuffer};

/// Lines kept for the console window between drains.
const LOG_BUFFER_LINES: usize = 1000;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let env_filter = std::env::var(LOG_ENV).ok();
    let filter = logging::resolve_filter(args.log_level.as_deref(), env_filter.as_deref(), &config.log_level);
    let buffer = LogBuffer::new(LOG_BUFFER_LINES);
    logging::init(&filter, buffer.clone(), args.log_file.as_deref())?;
    tracing::debug!(target: targets::APP, filter = %filter, "logging ready");

    if args.save_config {
        let path = config_path.context("no settings path; pass --config")?;
        config.save(&path)?;
        println!("{}", path.display());
        return Ok(());
    }

    cli::run(&args, config, Some(buffer), &mut std::io::stdout().lock())
}
