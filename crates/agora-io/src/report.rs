//! CSV reports for an experiment
//!
//! `orderings.csv` holds one row per speaking order, `turns.csv` one row per
//! agent per turn. Fields containing commas or quotes are quoted.

use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use agora_core::DebateOutcome;
use tracing::debug;

use crate::error::{IoError, Result};

pub const ORDERINGS_HEADER: &str = "ordering,final_valuation,turns,public_size,arguments";
pub const TURNS_HEADER: &str = "ordering,turn,agent,move";

fn field(raw: &str) -> Cow<'_, str> {
    if raw.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}

/// One row per ordering; `arguments` is the space-separated final public graph
pub fn write_orderings<W: Write>(out: W, outcomes: &[DebateOutcome]) -> io::Result<()> {
    let mut w = BufWriter::new(out);
    writeln!(w, "{ORDERINGS_HEADER}")?;

    for outcome in outcomes {
        let arguments = outcome
            .public_graph
            .arguments()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            w,
            "{},{:.6},{},{},{}",
            field(&outcome.ordering_label()),
            outcome.final_valuation,
            outcome.turns,
            outcome.public_graph.len(),
            field(&arguments),
        )?;
    }

    w.flush()
}

/// One row per agent per turn; `move` is empty when the agent passed
pub fn write_turns<W: Write>(out: W, outcomes: &[DebateOutcome]) -> io::Result<()> {
    let mut w = BufWriter::new(out);
    writeln!(w, "{TURNS_HEADER}")?;

    for outcome in outcomes {
        let label = outcome.ordering_label();
        for round in &outcome.rounds {
            for (agent, played) in &round.moves {
                let played = played.as_ref().map(|a| a.as_str()).unwrap_or("");
                writeln!(w, "{},{},{},{}", field(&label), round.round, agent, field(played))?;
            }
        }
    }

    w.flush()
}

/// Create `path` and fill it with `write`; an existing file is never touched
pub fn write_new_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut std::fs::File) -> io::Result<()>,
{
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(IoError::AlreadyExists(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    write(&mut file)?;
    debug!(path = %path.display(), "Wrote report");
    Ok(())
}

pub fn save_orderings(path: &Path, outcomes: &[DebateOutcome]) -> Result<()> {
    write_new_file(path, |file| write_orderings(file, outcomes))
}

pub fn save_turns(path: &Path, outcomes: &[DebateOutcome]) -> Result<()> {
    write_new_file(path, |file| write_turns(file, outcomes))
}
