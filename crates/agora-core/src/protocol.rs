//! Turn protocol between agents
//!
//! Agents speak in a fixed order, one pass over all of them being a round.
//! The debate ends the first time a whole round leaves the public graph
//! unchanged. Since the public graph only grows inside a finite universe,
//! a debate never lasts more than `|UG|` rounds.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, AgentId, History};
use crate::error::{DebateError, Result};
use crate::graph::{ArgumentId, Graph};
use crate::valuation::Valuator;

/// Public state at the end of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    /// Round number, starting at 1
    pub round: u32,
    /// Moves in speaking order (`None` = passed)
    pub moves: Vec<(AgentId, Option<ArgumentId>)>,
    /// Issue valuation after the round
    pub valuation: f64,
    /// Public graph after the round
    pub public_graph: Graph,
}

/// Result of running the protocol for one speaking order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Speaking order
    pub ordering: Vec<AgentId>,
    /// Issue valuation of the final public graph
    pub final_valuation: f64,
    /// Final public graph
    pub public_graph: Graph,
    /// Completed rounds, the final idle one included
    pub turns: u32,
    /// Snapshot per round; the last equals the one before it
    pub rounds: Vec<DebateRound>,
    /// Full per-turn history of every agent, in speaking order
    pub histories: Vec<(AgentId, History)>,
}

impl DebateOutcome {
    /// Comma-joined agent names, e.g. `A2,A0,A1`
    pub fn ordering_label(&self) -> String {
        ordering_label(&self.ordering)
    }
}

/// Comma-joined agent names
pub fn ordering_label(ordering: &[AgentId]) -> String {
    ordering
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Run the debate with `agents` speaking in slice order.
///
/// Histories are cleared first, so the same agents can be reused run after
/// run.
pub fn run_protocol(
    universe: &Graph,
    issue: &ArgumentId,
    agents: &mut [Agent],
    valuator: &Valuator,
) -> Result<DebateOutcome> {
    if !universe.contains(issue) {
        return Err(DebateError::MissingArgument {
            argument: issue.clone(),
        });
    }
    for agent in agents.iter_mut() {
        agent.reset_history();
    }

    let ordering: Vec<AgentId> = agents.iter().map(Agent::id).collect();
    let mut public = Graph::with_issue(issue.clone());
    let mut previous: Option<Graph> = None;
    let mut turn: u32 = 0;
    let mut rounds = Vec::new();

    while previous.as_ref() != Some(&public) {
        turn += 1;
        previous = Some(public.clone());

        let mut moves = Vec::with_capacity(agents.len());
        for agent in agents.iter_mut() {
            public = agent.play(&public, universe, turn)?;
            let played = agent.history().get(&turn).cloned().flatten();
            moves.push((agent.id(), played));
        }

        let valuation = valuator.value(&public, issue)?;
        debug!(turn, valuation, size = public.len(), "Round complete");
        rounds.push(DebateRound {
            round: turn,
            moves,
            valuation,
            public_graph: public.clone(),
        });
    }

    let final_valuation = valuator.value(&public, issue)?;
    let histories = agents
        .iter()
        .map(|a| (a.id(), a.history().clone()))
        .collect();

    info!(
        ordering = %ordering_label(&ordering),
        turns = turn,
        final_valuation,
        "Debate concluded"
    );

    Ok(DebateOutcome {
        ordering,
        final_valuation,
        public_graph: public,
        turns: turn,
        rounds,
        histories,
    })
}

/// Lazy enumeration of every permutation of `0..n`, in lexicographic order
#[derive(Debug, Clone)]
pub struct Orderings {
    current: Option<Vec<usize>>,
}

impl Orderings {
    pub fn new(n: usize) -> Self {
        Self {
            current: Some((0..n).collect()),
        }
    }
}

impl Iterator for Orderings {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut next = current.clone();
        if next_permutation(&mut next) {
            self.current = Some(next);
        }
        Some(current)
    }
}

/// Rearrange into the next lexicographic permutation; false on the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    let n = items.len();
    if n < 2 {
        return false;
    }

    let mut i = n - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = n - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

/// Every ordering of `items`, lazily. Yields `n!` orderings.
pub fn all_orderings<T>(items: &[T]) -> impl Iterator<Item = Vec<&T>> + '_ {
    Orderings::new(items.len()).map(move |perm| perm.into_iter().map(|i| &items[i]).collect())
}

/// `n!`, or `None` on overflow
pub fn ordering_count(n: usize) -> Option<usize> {
    (1..=n).try_fold(1usize, |acc, k| acc.checked_mul(k))
}
