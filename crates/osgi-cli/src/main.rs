//! osgi-deps CLI
//!
//! Indexes a project description and answers bundle dependency queries.

mod cli;
mod commands;
mod context;
mod error;
mod project_file;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = context::load_config(&cli.project, cli.config.as_deref())?;
    let filter = if cli.verbose {
        "debug"
    } else {
        config.logging.filter.as_str()
    };
    osgi_index::logging::init(filter)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;
    tracing::debug!(project = %cli.project.display(), "Verbose mode enabled");

    let ctx = Context::open(&cli.project, config, cli.json)?;
    execute_command(&ctx, cli.command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve { module } => commands::run_resolve(ctx, &module),
        Commands::Provides { package } => commands::run_provides(ctx, &package),
        Commands::Bundles => commands::run_bundles(ctx),
        Commands::Check => commands::run_check(ctx),
    }
}
