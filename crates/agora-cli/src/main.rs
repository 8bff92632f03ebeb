//! Agora CLI - speaking-order experiments on argumentation debates
//!
//! # Usage
//!
//! ```bash
//! # Generate a universe, four agents, and run every speaking order
//! agora generate --agents 4 --seed 42
//!
//! # Re-run the experiment stored in a results folder
//! agora replay --dir results/debate_1
//!
//! # Value one argument of an APX graph
//! agora value --file results/debate_1/universe_graph.apx
//!
//! # Show version and effective configuration
//! agora info
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod settings;

use commands::{generate, info, replay, value};
use settings::Settings;

/// Agora - does the order in which agents speak change how a debate ends?
#[derive(Parser)]
#[command(
    name = "agora",
    version,
    about = "Agora - speaking-order experiments on argumentation debates",
    long_about = "Agora runs a debate between agents over a shared argumentation graph\n\
                  once per speaking order, and reports how the issue's final\n\
                  belief strength depends on who speaks first."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file layered over the defaults
    #[arg(long, value_name = "FILE", global = true, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Evaluate speaking orders in parallel
    #[arg(long, global = true)]
    parallel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a universe and agents, then run every speaking order
    #[command(name = "generate")]
    Generate(generate::GenerateArgs),

    /// Re-run an experiment stored in a results folder
    #[command(name = "replay")]
    Replay(replay::ReplayArgs),

    /// Print the valuation of an argument in an APX graph
    #[command(name = "value")]
    Value(value::ValueArgs),

    /// Show version and effective configuration
    #[command(name = "info")]
    Info(info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;
    if cli.parallel {
        settings.debate.parallel = true;
    }

    match cli.command {
        Commands::Generate(args) => generate::run(args, settings),
        Commands::Replay(args) => replay::run(args, settings),
        Commands::Value(args) => value::run(args, settings),
        Commands::Info(args) => info::run(args, settings),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}
