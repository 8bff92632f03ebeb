//! Replay command - re-run an experiment from its stored graphs
//!
//! Usage:
//! ```bash
//! agora replay --dir results/debate_3
//! ```
//!
//! Reports already present in the folder are printed instead of rewritten.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use agora_io::{report, DebateSource, ResultsDir, StoredSource};

use super::{print_summary, run_experiment, with_comfort};
use crate::settings::Settings;

/// Arguments for the replay command
#[derive(Args)]
pub struct ReplayArgs {
    /// Results folder holding `universe_graph.apx` and `agent_<k>.apx`
    #[arg(long, short = 'd', value_name = "DIR")]
    dir: PathBuf,

    /// Comfort tolerance given to every agent
    #[arg(long)]
    comfort: Option<f64>,
}

/// Run the replay command
pub fn run(args: ReplayArgs, settings: Settings) -> Result<()> {
    let config = with_comfort(settings.debate, args.comfort)?;
    let issue = config.issue_id();

    let dir = ResultsDir::open(&args.dir)
        .with_context(|| format!("Cannot open results folder {}", args.dir.display()))?;
    let mut source = StoredSource::new(dir.clone());
    let setup = source
        .load(&issue)
        .with_context(|| format!("Failed to load graphs from {}", args.dir.display()))?;

    println!("{}", "Agora Debate Replay".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!("  {} {}", "Folder:".dimmed(), dir.path().display());
    println!("  {} {}", "Agents:".dimmed(), setup.opinions.len());

    let (outcomes, summary) = run_experiment(setup, &config)?;

    write_or_print(&dir.orderings_path(), |w| report::write_orderings(w, &outcomes))?;
    write_or_print(&dir.turns_path(), |w| report::write_turns(w, &outcomes))?;
    if dir.summary_path().exists() {
        crate::print_info("summary.json already present, left as is");
    } else {
        dir.save_summary(&summary)?;
    }

    print_summary(&summary);
    Ok(())
}

fn write_or_print<F>(path: &Path, write: F) -> Result<()>
where
    F: Fn(&mut dyn io::Write) -> io::Result<()>,
{
    if path.exists() {
        crate::print_info(&format!("{} already exists, printing instead", path.display()));
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write(&mut lock)?;
    } else {
        report::write_new_file(path, |file| write(file))?;
        crate::print_success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}
