// ABOUTME: Entry point for the stackhand CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use stackhand::error::Result;
use stackhand::output::Output;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output.into());

    if let Err(e) = run(cli.command, &output) {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { app, force } => commands::init(app.as_deref(), force, output),
        Commands::Plan => commands::plan(output),
    }
}
