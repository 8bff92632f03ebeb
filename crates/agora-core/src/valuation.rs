//! Belief-strength valuation
//!
//! An unattacked argument is worth 1. An attacked argument is worth
//! `1 / (1 + Σ value(attacker))`, applied recursively down to the leaves.
//!
//! Two strategies compute this:
//! - [`iterative_valuation`]: synchronous relaxation from all-ones until the
//!   total change across all arguments drops under a threshold. Tolerates
//!   cycles and is the default.
//! - [`recursive_valuation`]: top-down with an explicit per-call
//!   [`ValuationCache`]. Fails fast with [`DebateError::CyclicGraph`] when the
//!   call chain revisits an argument.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{DebateError, Result};
use crate::graph::{ArgumentId, Graph};

/// Default stop threshold on the total per-round change
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Default cap on relaxation rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Which evaluation strategy a [`Valuator`] uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationStrategy {
    /// Fixed-point relaxation (cycle tolerant)
    #[default]
    Iterative,
    /// Memoized recursion (acyclic graphs only)
    Recursive,
}

impl std::str::FromStr for ValuationStrategy {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "iterative" => Ok(Self::Iterative),
            "recursive" => Ok(Self::Recursive),
            other => Err(DebateError::InvalidConfig(format!(
                "unknown valuation strategy '{other}'"
            ))),
        }
    }
}

/// Memo table for one graph, owned by the caller of [`recursive_valuation`].
///
/// Reusing a cache across different graphs gives wrong answers.
#[derive(Debug, Clone, Default)]
pub struct ValuationCache {
    values: HashMap<ArgumentId, f64>,
}

impl ValuationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously computed value of `argument`
    pub fn get(&self, argument: &ArgumentId) -> Option<f64> {
        self.values.get(argument).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Recursive valuation with memoization and cycle detection
pub fn recursive_valuation(
    graph: &Graph,
    argument: &ArgumentId,
    cache: &mut ValuationCache,
) -> Result<f64> {
    let mut on_path = BTreeSet::new();
    visit(graph, argument, cache, &mut on_path)
}

fn visit(
    graph: &Graph,
    argument: &ArgumentId,
    cache: &mut ValuationCache,
    on_path: &mut BTreeSet<ArgumentId>,
) -> Result<f64> {
    if let Some(value) = cache.get(argument) {
        return Ok(value);
    }
    if !on_path.insert(argument.clone()) {
        return Err(DebateError::CyclicGraph {
            argument: argument.clone(),
        });
    }

    let mut total = 0.0;
    for attacker in graph.attackers(argument)? {
        total += visit(graph, attacker, cache, on_path)?;
    }

    on_path.remove(argument);
    let value = 1.0 / (1.0 + total);
    cache.values.insert(argument.clone(), value);
    Ok(value)
}

/// Converged values of every argument in a graph
#[derive(Debug, Clone, PartialEq)]
pub struct Valuations {
    /// Value per argument
    pub values: BTreeMap<ArgumentId, f64>,
    /// Relaxation rounds performed
    pub rounds: usize,
}

impl Valuations {
    pub fn get(&self, argument: &ArgumentId) -> Option<f64> {
        self.values.get(argument).copied()
    }
}

/// Relax every argument of `graph` to its fixed point.
///
/// Each round recomputes all values from the previous round's values
/// (Jacobi update) and stops once the summed absolute change falls under
/// `threshold`.
pub fn iterative_valuations(
    graph: &Graph,
    threshold: f64,
    max_rounds: usize,
) -> Result<Valuations> {
    let ids: Vec<&ArgumentId> = graph.arguments().collect();
    let index: HashMap<&ArgumentId, usize> =
        ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut attackers: Vec<Vec<usize>> = Vec::with_capacity(ids.len());
    for id in &ids {
        let mut row = Vec::new();
        for attacker in graph.attackers(id)? {
            let &j = index
                .get(attacker)
                .ok_or_else(|| DebateError::UnknownArgument {
                    argument: attacker.clone(),
                })?;
            row.push(j);
        }
        attackers.push(row);
    }

    let n = ids.len();
    let mut current = vec![1.0_f64; n];
    let mut next = vec![0.0_f64; n];

    for round in 1..=max_rounds {
        for (i, row) in attackers.iter().enumerate() {
            let sum: f64 = row.iter().map(|&j| current[j]).sum();
            next[i] = 1.0 / (1.0 + sum);
        }

        let delta: f64 = current
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();

        std::mem::swap(&mut current, &mut next);

        if delta < threshold {
            let values = ids
                .into_iter()
                .cloned()
                .zip(current)
                .collect();
            return Ok(Valuations {
                values,
                rounds: round,
            });
        }
    }

    // blame the argument that was still moving the most
    let worst = current
        .iter()
        .zip(next.iter())
        .map(|(a, b)| (a - b).abs())
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| ids[i].clone())
        .unwrap_or_else(|| ArgumentId::new(""));

    Err(DebateError::NonConvergence {
        argument: worst,
        rounds: max_rounds,
    })
}

/// Iterative valuation of a single argument
pub fn iterative_valuation(
    graph: &Graph,
    argument: &ArgumentId,
    threshold: f64,
    max_rounds: usize,
) -> Result<f64> {
    if !graph.contains(argument) {
        return Err(DebateError::UnknownArgument {
            argument: argument.clone(),
        });
    }
    let valuations = iterative_valuations(graph, threshold, max_rounds)?;
    valuations
        .get(argument)
        .ok_or_else(|| DebateError::UnknownArgument {
            argument: argument.clone(),
        })
}

/// Valuation with the default iterative settings
pub fn valuation(graph: &Graph, argument: &ArgumentId) -> Result<f64> {
    Valuator::default().value(graph, argument)
}

/// Strategy plus its parameters, shared by agents and the protocol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuator {
    pub strategy: ValuationStrategy,
    pub convergence_threshold: f64,
    pub max_iterations: usize,
}

impl Default for Valuator {
    fn default() -> Self {
        Self {
            strategy: ValuationStrategy::Iterative,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Valuator {
    /// Recursive strategy, for small acyclic graphs
    pub fn recursive() -> Self {
        Self {
            strategy: ValuationStrategy::Recursive,
            ..Self::default()
        }
    }

    /// Value of `argument` in `graph`
    pub fn value(&self, graph: &Graph, argument: &ArgumentId) -> Result<f64> {
        match self.strategy {
            ValuationStrategy::Iterative => iterative_valuation(
                graph,
                argument,
                self.convergence_threshold,
                self.max_iterations,
            ),
            ValuationStrategy::Recursive => {
                let mut cache = ValuationCache::new();
                recursive_valuation(graph, argument, &mut cache)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> ArgumentId {
        ArgumentId::from(label)
    }

    fn both(graph: &Graph, argument: &str) -> (f64, f64) {
        let recursive = Valuator::recursive().value(graph, &id(argument)).unwrap();
        let iterative = Valuator::default().value(graph, &id(argument)).unwrap();
        (recursive, iterative)
    }

    #[test]
    fn test_unattacked_is_one() {
        let g = Graph::with_issue("i");
        assert_eq!(both(&g, "i"), (1.0, 1.0));
    }

    #[test]
    fn test_path_graph() {
        let g = Graph::from_adjacency([("i", vec!["a"]), ("a", vec!["d"]), ("d", vec![])]);
        let (r, i) = both(&g, "i");
        assert!((r - 2.0 / 3.0).abs() < 1e-12);
        assert!((i - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fan_in_graph() {
        let g = Graph::from_adjacency([
            ("i", vec!["a", "b", "c"]),
            ("a", vec![]),
            ("b", vec![]),
            ("c", vec![]),
        ]);
        let (r, i) = both(&g, "i");
        assert_eq!(r, 0.25);
        assert!((i - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_shared_attacker_uses_cache() {
        let g = Graph::from_adjacency([
            ("i", vec!["a", "b"]),
            ("a", vec!["x"]),
            ("b", vec!["x"]),
            ("x", vec![]),
        ]);
        let mut cache = ValuationCache::new();
        let value = recursive_valuation(&g, &id("i"), &mut cache).unwrap();
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get(&id("x")), Some(1.0));
        assert!((value - 1.0 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_recursive_rejects_cycle() {
        let g = Graph::from_adjacency([("i", vec!["a"]), ("a", vec!["b"]), ("b", vec!["a"])]);
        let err = Valuator::recursive().value(&g, &id("i")).unwrap_err();
        assert!(matches!(err, DebateError::CyclicGraph { .. }));
    }

    #[test]
    fn test_iterative_tolerates_cycle() {
        // a attacks itself: x = 1 / (1 + x)
        let g = Graph::from_adjacency([("a", vec!["a"])]);
        let value = valuation(&g, &id("a")).unwrap();
        let golden = (5.0_f64.sqrt() - 1.0) / 2.0;
        assert!((value - golden).abs() < 1e-3);
    }

    #[test]
    fn test_iterative_non_convergence_is_reported() {
        let g = Graph::from_adjacency([("i", vec!["a"]), ("a", vec!["d"]), ("d", vec![])]);
        let err = iterative_valuation(&g, &id("i"), 1e-4, 1).unwrap_err();
        assert!(matches!(err, DebateError::NonConvergence { rounds: 1, .. }));
    }

    #[test]
    fn test_unknown_argument() {
        let g = Graph::with_issue("i");
        for valuator in [Valuator::default(), Valuator::recursive()] {
            let err = valuator.value(&g, &id("nope")).unwrap_err();
            assert_eq!(err, DebateError::UnknownArgument { argument: id("nope") });
        }
    }

    #[test]
    fn test_dangling_attacker_fails() {
        let g = Graph::from_adjacency([("i", vec!["ghost"])]);
        for valuator in [Valuator::default(), Valuator::recursive()] {
            let err = valuator.value(&g, &id("i")).unwrap_err();
            assert_eq!(err, DebateError::UnknownArgument { argument: id("ghost") });
        }
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Recursive".parse::<ValuationStrategy>().unwrap(), ValuationStrategy::Recursive);
        assert!("jacobi".parse::<ValuationStrategy>().is_err());
    }
}
