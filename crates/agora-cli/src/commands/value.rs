//! Value command - belief strength of arguments in an APX graph
//!
//! Usage:
//! ```bash
//! agora value --file universe_graph.apx
//! agora value --file agent_0.apx --argument 3 --strategy recursive
//! agora value --file agent_0.apx --all
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use agora_core::{
    iterative_valuations, recursive_valuation, ArgumentId, ValuationCache, ValuationStrategy,
    Valuator,
};

use crate::settings::Settings;

/// Arguments for the value command
#[derive(Args)]
pub struct ValueArgs {
    /// APX file holding the graph
    #[arg(long, short = 'f', value_name = "FILE")]
    file: PathBuf,

    /// Argument to value (defaults to the issue)
    #[arg(long, short = 'a')]
    argument: Option<String>,

    /// Valuation strategy: iterative or recursive
    #[arg(long, short = 's')]
    strategy: Option<ValuationStrategy>,

    /// Print every argument's valuation
    #[arg(long, conflicts_with = "argument")]
    all: bool,
}

/// Run the value command
pub fn run(args: ValueArgs, settings: Settings) -> Result<()> {
    let graph = agora_io::load_graph(&args.file)
        .with_context(|| format!("Failed to read graph from {}", args.file.display()))?;

    let mut valuator: Valuator = settings.debate.valuator();
    if let Some(strategy) = args.strategy {
        valuator.strategy = strategy;
    }

    if args.all {
        let (values, rounds) = match valuator.strategy {
            ValuationStrategy::Iterative => {
                let relaxed = iterative_valuations(
                    &graph,
                    valuator.convergence_threshold,
                    valuator.max_iterations,
                )
                .context("Valuation did not settle")?;
                (relaxed.values, Some(relaxed.rounds))
            }
            ValuationStrategy::Recursive => {
                let mut cache = ValuationCache::new();
                let values = graph
                    .arguments()
                    .map(|a| Ok((a.clone(), recursive_valuation(&graph, a, &mut cache)?)))
                    .collect::<agora_core::Result<BTreeMap<_, _>>>()
                    .context("Recursive valuation failed")?;
                (values, None)
            }
        };

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            Cell::new("Argument").fg(Color::Cyan),
            Cell::new("Attackers").fg(Color::Cyan),
            Cell::new("Valuation").fg(Color::Cyan),
        ]);
        for (argument, attackers) in graph.iter() {
            let value = values.get(argument).copied().unwrap_or(f64::NAN);
            table.add_row(vec![
                Cell::new(argument),
                Cell::new(attackers.len()),
                Cell::new(format!("{value:.6}")).fg(Color::Green),
            ]);
        }
        println!("{table}");
        if let Some(rounds) = rounds {
            println!("  {} {}", "Rounds:".dimmed(), rounds);
        }
        return Ok(());
    }

    let argument = args
        .argument
        .map(ArgumentId::new)
        .unwrap_or_else(|| settings.debate.issue_id());
    let value = valuator
        .value(&graph, &argument)
        .with_context(|| format!("Cannot value argument {argument}"))?;

    println!("{} {}", format!("v({argument}) =").bold(), format!("{value:.6}").green());
    Ok(())
}
