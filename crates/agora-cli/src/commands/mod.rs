pub mod generate;
pub mod info;
pub mod replay;
pub mod value;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use tracing::info;

use agora_core::{ordering_count, DebateConfig, DebateOutcome, Experiment, ExperimentSummary};
use agora_io::DebateSetup;

/// Above this many agents the `n!` orderings take a long time
const LARGE_AGENT_COUNT: usize = 8;

/// Apply a `--comfort` flag over the layered settings
pub(crate) fn with_comfort(mut config: DebateConfig, comfort: Option<f64>) -> Result<DebateConfig> {
    if let Some(comfort) = comfort {
        config.comfort = comfort;
    }
    config.validate().context("Invalid debate configuration")?;
    Ok(config)
}

/// Run every speaking order of `setup`
pub(crate) fn run_experiment(
    setup: DebateSetup,
    config: &DebateConfig,
) -> Result<(Vec<DebateOutcome>, ExperimentSummary)> {
    let agents = setup.opinions.len();
    if agents == 0 {
        bail!("An experiment needs at least one agent");
    }
    let Some(count) = ordering_count(agents) else {
        bail!("{agents} agents have too many speaking orders to enumerate");
    };
    if agents > LARGE_AGENT_COUNT {
        crate::print_warning(&format!("{agents} agents means {count} speaking orders"));
    }

    info!(
        agents,
        orderings = count,
        arguments = setup.universe.len(),
        parallel = config.parallel,
        "Running experiment"
    );
    let experiment = Experiment::new(setup.universe, setup.opinions, config)
        .context("Failed to set up the experiment")?;
    experiment.run().context("Debate failed")
}

/// Summary table followed by one row per distinct outcome
pub(crate) fn print_summary(summary: &ExperimentSummary) {
    println!();
    println!("{}", "Experiment Summary".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!("  {} {}", "Agents:".dimmed(), summary.agent_count);
    println!("  {} {}", "Orderings:".dimmed(), summary.orderings);
    println!(
        "  {} {:.4} / {:.4} / {:.4}",
        "Valuation min/mean/max:".dimmed(),
        summary.min_valuation,
        summary.mean_valuation,
        summary.max_valuation
    );
    println!("  {} {:.2}", "Mean turns:".dimmed(), summary.mean_turns);
    let sensitive = if summary.order_sensitive {
        "yes".yellow().bold()
    } else {
        "no".green()
    };
    println!("  {} {}", "Order sensitive:".dimmed(), sensitive);
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Final valuation").fg(Color::Cyan),
            Cell::new("Orderings").fg(Color::Cyan),
            Cell::new("Examples").fg(Color::Cyan),
        ]);

    for group in &summary.outcomes {
        let examples: Vec<String> = group
            .orderings
            .iter()
            .take(3)
            .map(|label| format!("[{label}]"))
            .collect();
        let more = group.orderings.len().saturating_sub(examples.len());
        let mut shown = examples.join(" ");
        if more > 0 {
            shown.push_str(&format!(" +{more}"));
        }

        table.add_row(vec![
            Cell::new(format!("{:.6}", group.final_valuation)).fg(Color::Green),
            Cell::new(group.orderings.len()),
            Cell::new(shown),
        ]);
    }

    println!("{table}");
}
