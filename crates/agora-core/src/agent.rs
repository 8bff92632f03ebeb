//! Debating agents
//!
//! An [`Agent`] privately holds an opinion graph and the issue value it
//! implies. Each turn it either stays silent (it is inside its comfort zone,
//! or nothing it holds brings the public value closer) or adds the single
//! argument that brings the public issue value closest to its own.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::{DebateConfig, TieBreak};
use crate::error::{DebateError, Result};
use crate::graph::{ArgumentId, Graph, ReverseIndex};
use crate::valuation::Valuator;

/// Gaps closer than this count as a tie for seeded tie-breaking
const TIE_EPSILON: f64 = 1e-12;

/// Stable index of an agent within one experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Turn number → argument played, `None` when the agent passed
pub type History = BTreeMap<u32, Option<ArgumentId>>;

/// Per-agent behavior settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Comfort tolerance `cl` around the target value
    pub comfort: f64,
    /// Candidate tie-breaking rule
    pub tie_break: TieBreak,
    /// Valuation used for every estimate the agent makes
    pub valuator: Valuator,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from(&DebateConfig::default())
    }
}

impl From<&DebateConfig> for AgentConfig {
    fn from(config: &DebateConfig) -> Self {
        Self {
            comfort: config.comfort,
            tie_break: config.tie_break,
            valuator: config.valuator(),
        }
    }
}

/// A debating agent
///
/// The opinion graph, target value and reverse index never change after
/// construction and are shared through `Arc`, so cloning an agent for an
/// independent run is cheap. Only the history is per-run state.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    issue: ArgumentId,
    opinion: Arc<Graph>,
    index: Arc<ReverseIndex>,
    target: f64,
    config: AgentConfig,
    history: History,
}

impl Agent {
    /// Create an agent holding `opinion`, a subgraph of `universe`.
    ///
    /// The target value is the issue's valuation in the opinion graph,
    /// computed once here.
    pub fn new(
        id: AgentId,
        issue: ArgumentId,
        opinion: Graph,
        universe: &Graph,
        config: AgentConfig,
    ) -> Result<Self> {
        if config.comfort < 0.0 || !config.comfort.is_finite() {
            return Err(DebateError::InvalidConfig(format!(
                "comfort of {id} must be non-negative, got {}",
                config.comfort
            )));
        }
        opinion.check_subgraph_of(universe)?;

        let target = config.valuator.value(&opinion, &issue)?;
        let index = ReverseIndex::build(universe, &opinion);

        debug!(agent = %id, arguments = opinion.len(), target, "Agent created");

        Ok(Self {
            id,
            issue,
            opinion: Arc::new(opinion),
            index: Arc::new(index),
            target,
            config,
            history: History::new(),
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Display name, `A<k>`
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    /// Target valuation `Vk`
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn comfort(&self) -> f64 {
        self.config.comfort
    }

    pub fn opinion(&self) -> &Graph {
        &self.opinion
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Forget every recorded move before an independent run
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Whether the public issue value lies in `[Vk - cl, Vk + cl]`
    pub fn in_comfort_zone(&self, public: &Graph) -> Result<bool> {
        let value = self.config.valuator.value(public, &self.issue)?;
        Ok(self.within_comfort(value))
    }

    fn within_comfort(&self, value: f64) -> bool {
        value >= self.target - self.config.comfort && value <= self.target + self.config.comfort
    }

    /// Arguments this agent holds that directly attack something in the
    /// public graph and are not yet in it, in canonical order.
    pub fn candidate_moves(&self, public: &Graph, universe: &Graph) -> Result<Vec<ArgumentId>> {
        ensure_within(public, universe)?;

        let moves = self
            .index
            .iter()
            .filter(|(attacker, _)| !public.contains(attacker))
            .filter(|(_, targets)| targets.iter().any(|t| public.contains(t)))
            .map(|(attacker, _)| attacker.clone())
            .collect();
        Ok(moves)
    }

    /// The argument to play this turn, if any
    pub fn best_move(&self, public: &Graph, universe: &Graph) -> Result<Option<ArgumentId>> {
        ensure_within(public, universe)?;

        let current = self.config.valuator.value(public, &self.issue)?;
        if self.within_comfort(current) {
            debug!(agent = %self.id, current, target = self.target, "In comfort zone, passing");
            return Ok(None);
        }

        let candidates = self.candidate_moves(public, universe)?;
        if candidates.is_empty() {
            debug!(agent = %self.id, "No playable moves");
            return Ok(None);
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let trial = universe.extend(public, &candidate)?;
            let value = self.config.valuator.value(&trial, &self.issue)?;
            scored.push((candidate, (value - self.target).abs()));
        }

        let gap = (current - self.target).abs();
        let chosen = match self.config.tie_break {
            TieBreak::FirstImprovement => first_improvement(scored, gap),
            TieBreak::Seeded { seed } => {
                let mut rng = StdRng::seed_from_u64(self.mix_seed(seed, public));
                seeded_choice(scored, gap, &mut rng)
            }
        };

        match &chosen {
            Some(argument) => debug!(agent = %self.id, %argument, gap, "Chose move"),
            None => debug!(agent = %self.id, gap, "No candidate improves the gap"),
        }
        Ok(chosen)
    }

    /// Take one turn: record the decision and return the next public graph.
    ///
    /// The input graph is never modified.
    pub fn play(&mut self, public: &Graph, universe: &Graph, turn: u32) -> Result<Graph> {
        let chosen = self.best_move(public, universe)?;
        let next = match &chosen {
            Some(argument) => universe.extend(public, argument)?,
            None => public.clone(),
        };
        self.history.insert(turn, chosen);
        Ok(next)
    }

    // Same agent, seed and public graph always draw the same candidate.
    fn mix_seed(&self, seed: u64, public: &Graph) -> u64 {
        seed ^ (self.id.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ public.len() as u64
    }
}

fn ensure_within(public: &Graph, universe: &Graph) -> Result<()> {
    match public.arguments().find(|a| !universe.contains(a)) {
        Some(argument) => Err(DebateError::MissingArgument {
            argument: argument.clone(),
        }),
        None => Ok(()),
    }
}

fn first_improvement(scored: Vec<(ArgumentId, f64)>, gap: f64) -> Option<ArgumentId> {
    let mut best = None;
    let mut best_gap = gap;
    for (candidate, candidate_gap) in scored {
        if candidate_gap < best_gap {
            best_gap = candidate_gap;
            best = Some(candidate);
        }
    }
    best
}

fn seeded_choice(scored: Vec<(ArgumentId, f64)>, gap: f64, rng: &mut StdRng) -> Option<ArgumentId> {
    let min = scored.iter().map(|(_, g)| *g).fold(f64::INFINITY, f64::min);
    if min >= gap {
        return None;
    }
    let mut tied: Vec<ArgumentId> = scored
        .into_iter()
        .filter(|(_, g)| (g - min).abs() <= TIE_EPSILON)
        .map(|(candidate, _)| candidate)
        .collect();
    let pick = rng.random_range(0..tied.len());
    Some(tied.swap_remove(pick))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> ArgumentId {
        ArgumentId::from(label)
    }

    fn universe() -> Graph {
        Graph::from_adjacency([
            ("i", vec!["a", "b", "c"]),
            ("a", vec!["d"]),
            ("b", vec!["e"]),
            ("c", vec![]),
            ("d", vec![]),
            ("e", vec![]),
        ])
    }

    fn agent_with(arguments: &[&str], config: AgentConfig) -> Agent {
        let ug = universe();
        let keys: Vec<ArgumentId> = arguments.iter().map(|a| id(a)).collect();
        let og = ug.restrict(&keys).unwrap();
        Agent::new(AgentId(0), id("i"), og, &ug, config).unwrap()
    }

    #[test]
    fn test_target_from_opinion() {
        let agent = agent_with(&["i", "a", "b", "c"], AgentConfig::default());
        assert!((agent.target() - 0.25).abs() < 1e-9);
        assert_eq!(agent.name(), "A0");
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_comfort_zone_bounds() {
        let agent = agent_with(&["i", "a", "b", "c"], AgentConfig::default());
        let ug = universe();

        let three = ug.restrict(&[id("i"), id("a"), id("b"), id("c")]).unwrap();
        assert!(agent.in_comfort_zone(&three).unwrap());

        let two = ug.restrict(&[id("i"), id("a"), id("b")]).unwrap();
        // 1/3 is 0.083 away from 0.25
        assert!(!agent.in_comfort_zone(&two).unwrap());
    }

    #[test]
    fn test_candidates_require_direct_attack_and_ownership() {
        let agent = agent_with(&["i", "a", "c", "d", "e"], AgentConfig::default());
        let ug = universe();
        let pg = Graph::with_issue("i");

        // d only attacks a, which is not public yet; b is not held
        assert_eq!(agent.candidate_moves(&pg, &ug).unwrap(), vec![id("a"), id("c")]);

        let pg = ug.extend(&pg, &id("a")).unwrap();
        assert_eq!(agent.candidate_moves(&pg, &ug).unwrap(), vec![id("c"), id("d")]);
    }

    #[test]
    fn test_best_move_closes_gap() {
        let agent = agent_with(&["i", "a", "b", "c"], AgentConfig::default());
        let ug = universe();
        let pg = ug.restrict(&[id("i"), id("a"), id("b")]).unwrap();

        assert_eq!(agent.best_move(&pg, &ug).unwrap(), Some(id("c")));
    }

    #[test]
    fn test_first_improvement_keeps_earliest_tie() {
        let agent = agent_with(&["i", "a", "b", "c"], AgentConfig::default());
        let ug = universe();
        let pg = Graph::with_issue("i");

        // a, b and c each take the issue to 0.5; a comes first
        assert_eq!(agent.best_move(&pg, &ug).unwrap(), Some(id("a")));
    }

    #[test]
    fn test_moves_toward_target_then_passes() {
        // target 1.0: every attacker on the issue only widens the gap
        let config = AgentConfig {
            comfort: 0.0,
            ..AgentConfig::default()
        };
        let agent = agent_with(&["i", "d"], config);
        let ug = universe();
        let pg = ug.restrict(&[id("i"), id("a")]).unwrap();

        assert!(!agent.in_comfort_zone(&pg).unwrap());
        assert_eq!(agent.candidate_moves(&pg, &ug).unwrap(), vec![id("d")]);
        // d defends the issue: 1/(1+1/2) = 2/3, closer to 1 than 1/2
        assert_eq!(agent.best_move(&pg, &ug).unwrap(), Some(id("d")));

        let agent = agent_with(&["i", "c"], config);
        let pg = Graph::with_issue("i");
        // target 0.5, public value 1.0, c brings it to exactly 0.5
        assert_eq!(agent.best_move(&pg, &ug).unwrap(), Some(id("c")));
        let pg = ug.restrict(&[id("i"), id("c")]).unwrap();
        assert_eq!(agent.best_move(&pg, &ug).unwrap(), None);
    }

    #[test]
    fn test_seeded_tie_break_is_reproducible() {
        let config = AgentConfig {
            tie_break: TieBreak::Seeded { seed: 42 },
            ..AgentConfig::default()
        };
        let agent = agent_with(&["i", "a", "b", "c"], config);
        let ug = universe();
        let pg = Graph::with_issue("i");

        let first = agent.best_move(&pg, &ug).unwrap();
        let second = agent.best_move(&pg, &ug).unwrap();
        assert_eq!(first, second);
        assert!(matches!(first, Some(ref m) if ["a", "b", "c"].contains(&m.as_str())));
    }

    #[test]
    fn test_play_records_history_and_leaves_input() {
        let mut agent = agent_with(&["i", "a", "b", "c"], AgentConfig::default());
        let ug = universe();
        let pg = Graph::with_issue("i");

        let next = agent.play(&pg, &ug, 1).unwrap();
        assert_eq!(pg.len(), 1);
        assert_eq!(next.len(), 2);

        let same = agent
            .play(&ug.restrict(&[id("i"), id("a"), id("b"), id("c")]).unwrap(), &ug, 2)
            .unwrap();
        assert_eq!(same.len(), 4);

        assert_eq!(agent.history().get(&1), Some(&Some(id("a"))));
        assert_eq!(agent.history().get(&2), Some(&None));

        agent.reset_history();
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_public_outside_universe_is_rejected() {
        let agent = agent_with(&["i", "a"], AgentConfig::default());
        let ug = universe();
        let pg = Graph::from_adjacency([("i", Vec::<&str>::new()), ("zz", vec![])]);

        let err = agent.best_move(&pg, &ug).unwrap_err();
        assert_eq!(err, DebateError::MissingArgument { argument: id("zz") });
        assert!(agent.candidate_moves(&pg, &ug).is_err());
    }

    #[test]
    fn test_opinion_must_match_universe_attacks() {
        let ug = universe();

        // invents e -> a
        let invented = Graph::from_adjacency([("i", vec!["a"]), ("a", vec!["e"]), ("e", vec![])]);
        let err = Agent::new(AgentId(1), id("i"), invented, &ug, AgentConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DebateError::AttackMismatch {
                attacker: id("e"),
                target: id("a"),
            }
        );

        // drops a -> i
        let dropped = Graph::from_adjacency([("i", Vec::<&str>::new()), ("a", vec![])]);
        let err = Agent::new(AgentId(1), id("i"), dropped, &ug, AgentConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DebateError::AttackMismatch {
                attacker: id("a"),
                target: id("i"),
            }
        );
    }

    #[test]
    fn test_negative_comfort_rejected() {
        let ug = universe();
        let og = Graph::with_issue("i");
        let config = AgentConfig {
            comfort: -1.0,
            ..AgentConfig::default()
        };
        assert!(Agent::new(AgentId(3), id("i"), og, &ug, config).is_err());
    }
}
