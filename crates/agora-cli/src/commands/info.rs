//! Info command - Show version and effective configuration
//!
//! Usage:
//! ```bash
//! agora info
//! agora --config agora.toml info --json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use agora_core::TieBreak;

use crate::settings::Settings;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// Print the effective settings as JSON
    #[arg(long)]
    json: bool,
}

/// Run the info command
pub fn run(args: InfoArgs, settings: Settings) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let version = env!("CARGO_PKG_VERSION");
    let debate = &settings.debate;
    let generator = &settings.generator;

    println!("{}", "Agora - Speaking-Order Experiments".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version Information:".bold());
    println!("  {} {}", "CLI Version:".dimmed(), version.green());
    println!();

    println!("{}", "Debate:".bold());
    println!("  {} {}", "Issue:".dimmed(), debate.issue.green());
    println!("  {} {}", "Comfort:".dimmed(), debate.comfort);
    println!("  {} {:?}", "Strategy:".dimmed(), debate.strategy);
    println!(
        "  {} {} (max {} rounds)",
        "Convergence:".dimmed(),
        debate.convergence_threshold,
        debate.max_iterations
    );
    let tie_break = match debate.tie_break {
        TieBreak::FirstImprovement => "first improvement".to_string(),
        TieBreak::Seeded { seed } => format!("seeded ({seed})"),
    };
    println!("  {} {}", "Tie break:".dimmed(), tie_break);
    println!("  {} {}", "Parallel:".dimmed(), debate.parallel);
    println!();

    println!("{}", "Generator:".bold());
    println!(
        "  {} {}..={}",
        "Branches:".dimmed(),
        generator.min_branches,
        generator.max_branches
    );
    println!(
        "  {} {}..{}",
        "Tree size:".dimmed(),
        generator.min_tree_size,
        generator.max_tree_size
    );
    match generator.seed {
        Some(seed) => println!("  {} {}", "Seed:".dimmed(), seed),
        None => println!("  {} {}", "Seed:".dimmed(), "random".dimmed()),
    }
    println!();

    println!("{}", "Storage:".bold());
    println!("  {} {}", "Results:".dimmed(), settings.results_dir.display());
    println!();

    println!("{}", "Configuration:".bold());
    println!(
        "  {} Override with --config FILE or AGORA__<SECTION>__<KEY> variables",
        "ℹ".blue()
    );
    println!();

    Ok(())
}
