//! Generate command - new universe, new agents, every speaking order
//!
//! Usage:
//! ```bash
//! agora generate --agents 4
//! agora generate --agents 3 --seed 7 --out runs --comfort 0.1
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use agora_io::{report, DebateSource, GeneratedSource, ResultsDir, UniverseGenerator};

use super::{print_summary, run_experiment, with_comfort};
use crate::settings::Settings;

/// Arguments for the generate command
#[derive(Args)]
pub struct GenerateArgs {
    /// Number of agents taking part
    #[arg(long, short = 'n', value_name = "N")]
    agents: usize,

    /// Base folder for the new `debate_<n>` folder
    #[arg(long, short = 'o', value_name = "DIR")]
    out: Option<PathBuf>,

    /// Seed for the universe and opinion generator
    #[arg(long)]
    seed: Option<u64>,

    /// Comfort tolerance given to every agent
    #[arg(long)]
    comfort: Option<f64>,
}

/// Run the generate command
pub fn run(args: GenerateArgs, settings: Settings) -> Result<()> {
    let config = with_comfort(settings.debate, args.comfort)?;
    let issue = config.issue_id();

    let mut generator_config = settings.generator;
    if let Some(seed) = args.seed {
        generator_config.seed = Some(seed);
    }
    let generator = UniverseGenerator::new(generator_config).context("Invalid generator settings")?;

    let setup = GeneratedSource::new(generator, args.agents)
        .load(&issue)
        .context("Failed to generate the debate")?;

    let base = args.out.unwrap_or(settings.results_dir);
    let dir = ResultsDir::create_next(&base)
        .with_context(|| format!("Failed to create a results folder in {}", base.display()))?;

    println!("{}", "Agora Debate Generation".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!("  {} {}", "Folder:".dimmed(), dir.path().display());
    println!(
        "  {} {} arguments, {} attacks",
        "Universe:".dimmed(),
        setup.universe.len(),
        setup.universe.attack_count()
    );
    for (k, opinion) in setup.opinions.iter().enumerate() {
        println!("  {} {} arguments", format!("A{k}:").dimmed(), opinion.len());
    }

    dir.save_universe(&setup.universe)?;
    dir.save_opinions(&setup.opinions)?;

    let (outcomes, summary) = run_experiment(setup, &config)?;

    report::save_orderings(&dir.orderings_path(), &outcomes)?;
    report::save_turns(&dir.turns_path(), &outcomes)?;
    dir.save_summary(&summary)?;

    print_summary(&summary);
    crate::print_success(&format!("Results written to {}", dir.path().display()));
    Ok(())
}
