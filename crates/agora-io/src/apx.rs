//! APX graph files
//!
//! One fact per line:
//!
//! ```text
//! % comment
//! arg(0).
//! arg(1).
//! att(1,0).
//! ```
//!
//! `arg(x).` declares an argument and `att(a,b).` records that `a` attacks
//! `b`. Both ends of an attack must be declared on an earlier line.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::Path;

use agora_core::{ArgumentId, DebateError, Graph};
use tracing::{debug, warn};

use crate::error::{IoError, Result};

pub const EXTENSION: &str = "apx";

/// A single parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fact {
    Argument(ArgumentId),
    Attack { attacker: ArgumentId, target: ArgumentId },
}

fn malformed(line: usize, reason: impl Into<String>) -> IoError {
    IoError::Debate(DebateError::MalformedGraphFormat {
        line,
        reason: reason.into(),
    })
}

fn label(raw: &str, line: usize) -> Result<ArgumentId> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(['(', ')', ',', ' ']) {
        return Err(malformed(line, format!("invalid argument label '{raw}'")));
    }
    Ok(ArgumentId::new(raw))
}

/// `None` for blank and comment lines
fn parse_line(text: &str, line: usize) -> Result<Option<Fact>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('%') {
        return Ok(None);
    }

    let body = text
        .strip_suffix('.')
        .ok_or_else(|| malformed(line, "missing terminating '.'"))?
        .trim_end();

    if let Some(inner) = body.strip_prefix("arg(").and_then(|b| b.strip_suffix(')')) {
        return Ok(Some(Fact::Argument(label(inner, line)?)));
    }

    if let Some(inner) = body.strip_prefix("att(").and_then(|b| b.strip_suffix(')')) {
        let (attacker, target) = inner
            .split_once(',')
            .ok_or_else(|| malformed(line, "attack needs two arguments"))?;
        return Ok(Some(Fact::Attack {
            attacker: label(attacker, line)?,
            target: label(target, line)?,
        }));
    }

    Err(malformed(line, format!("unrecognized statement '{text}'")))
}

/// Parse APX text into a graph
pub fn parse_graph(input: &str) -> Result<Graph> {
    let mut graph = Graph::new();

    for (index, text) in input.lines().enumerate() {
        let line = index + 1;
        match parse_line(text, line)? {
            None => {}
            Some(Fact::Argument(argument)) => {
                if !graph.add_argument(argument.clone()) {
                    warn!(%argument, line, "Duplicate argument declaration ignored");
                }
            }
            Some(Fact::Attack { attacker, target }) => {
                for end in [&attacker, &target] {
                    if !graph.contains(end) {
                        return Err(malformed(
                            line,
                            format!("attack references undeclared argument {end}"),
                        ));
                    }
                }
                graph.add_attack(attacker, target)?;
            }
        }
    }

    Ok(graph)
}

/// Read and parse an APX file
pub fn load_graph(path: &Path) -> Result<Graph> {
    let input = fs::read_to_string(path)?;
    let graph = parse_graph(&input).map_err(|e| e.at_path(path))?;
    debug!(
        path = %path.display(),
        arguments = graph.len(),
        attacks = graph.attack_count(),
        "Loaded graph"
    );
    Ok(graph)
}

/// Every `arg` line in canonical order, then every attack
pub fn render_graph(graph: &Graph) -> String {
    let mut out = String::new();
    for argument in graph.arguments() {
        let _ = writeln!(out, "arg({argument}).");
    }
    for (attacker, target) in graph.attacks() {
        let _ = writeln!(out, "att({attacker},{target}).");
    }
    out
}

/// Write `graph` to `path`.
///
/// An existing empty file is reused; an existing file with content is left
/// untouched and reported as [`IoError::AlreadyExists`].
pub fn save_graph(path: &Path, graph: &Graph) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let file = OpenOptions::new().write(true).open(path)?;
            if file.metadata()?.len() > 0 {
                return Err(IoError::AlreadyExists(path.to_path_buf()));
            }
            file
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(render_graph(graph).as_bytes())?;
    file.flush()?;

    debug!(path = %path.display(), arguments = graph.len(), "Saved graph");
    Ok(())
}
