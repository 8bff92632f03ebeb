//! Order-sensitivity experiments
//!
//! An [`Experiment`] fixes a universe and a set of agents, then replays the
//! debate once per speaking order. Orderings are independent: each one runs
//! on its own clones of the agents, so they can also be spread over the rayon
//! pool.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::agent::{Agent, AgentConfig, AgentId};
use crate::config::DebateConfig;
use crate::error::{DebateError, Result};
use crate::graph::{ArgumentId, Graph};
use crate::protocol::{run_protocol, DebateOutcome, Orderings};
use crate::valuation::Valuator;

/// Final valuations closer than this are the same outcome
const SAME_OUTCOME_EPSILON: f64 = 1e-9;

/// A universe, its agents and the settings shared by every ordering
#[derive(Debug, Clone)]
pub struct Experiment {
    universe: Graph,
    issue: ArgumentId,
    agents: Vec<Agent>,
    valuator: Valuator,
    parallel: bool,
}

impl Experiment {
    /// Build agents `A0..An` from opinion graphs, all configured from `config`
    pub fn new(universe: Graph, opinions: Vec<Graph>, config: &DebateConfig) -> Result<Self> {
        config.validate()?;
        universe.validate()?;

        let issue = config.issue_id();
        let agent_config = AgentConfig::from(config);
        let agents = opinions
            .into_iter()
            .enumerate()
            .map(|(k, opinion)| Agent::new(AgentId(k), issue.clone(), opinion, &universe, agent_config))
            .collect::<Result<Vec<_>>>()?;

        Self::from_agents(universe, issue, agents, config.valuator(), config.parallel)
    }

    /// Wrap already-built agents
    pub fn from_agents(
        universe: Graph,
        issue: ArgumentId,
        agents: Vec<Agent>,
        valuator: Valuator,
        parallel: bool,
    ) -> Result<Self> {
        if !universe.contains(&issue) {
            return Err(DebateError::MissingArgument { argument: issue });
        }
        Ok(Self {
            universe,
            issue,
            agents,
            valuator,
            parallel,
        })
    }

    pub fn universe(&self) -> &Graph {
        &self.universe
    }

    pub fn issue(&self) -> &ArgumentId {
        &self.issue
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Run one ordering given as indices into [`Experiment::agents`]
    pub fn run_ordering(&self, order: &[usize]) -> Result<DebateOutcome> {
        let mut speakers = order
            .iter()
            .map(|&k| {
                self.agents.get(k).cloned().ok_or_else(|| {
                    DebateError::InvalidConfig(format!("ordering refers to unknown agent {k}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        run_protocol(&self.universe, &self.issue, &mut speakers, &self.valuator)
    }

    /// Every ordering, one after the other, in lexicographic order
    pub fn run_all(&self) -> Result<Vec<DebateOutcome>> {
        Orderings::new(self.agents.len())
            .map(|order| self.run_ordering(&order))
            .collect()
    }

    /// Every ordering on the rayon pool; results keep lexicographic order
    pub fn run_all_parallel(&self) -> Result<Vec<DebateOutcome>> {
        let orders: Vec<Vec<usize>> = Orderings::new(self.agents.len()).collect();
        orders
            .par_iter()
            .map(|order| self.run_ordering(order))
            .collect()
    }

    /// Run every ordering in the configured mode and summarize
    pub fn run(&self) -> Result<(Vec<DebateOutcome>, ExperimentSummary)> {
        let outcomes = if self.parallel {
            self.run_all_parallel()?
        } else {
            self.run_all()?
        };
        let summary = ExperimentSummary::from_outcomes(self.agents.len(), &outcomes);
        info!(
            agents = summary.agent_count,
            orderings = summary.orderings,
            distinct = summary.outcomes.len(),
            order_sensitive = summary.order_sensitive,
            "Experiment finished"
        );
        Ok((outcomes, summary))
    }
}

/// Orderings that ended on the same issue valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeGroup {
    pub final_valuation: f64,
    pub orderings: Vec<String>,
}

/// Aggregate over all orderings of one experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Unique identifier for this experiment
    pub id: Uuid,
    /// When the summary was produced
    pub recorded_at: DateTime<Utc>,
    pub agent_count: usize,
    /// Number of orderings run
    pub orderings: usize,
    pub min_valuation: f64,
    pub max_valuation: f64,
    pub mean_valuation: f64,
    pub mean_turns: f64,
    /// Distinct final valuations, ascending
    pub outcomes: Vec<OutcomeGroup>,
    /// More than one distinct final valuation was reached
    pub order_sensitive: bool,
}

impl ExperimentSummary {
    pub fn from_outcomes(agent_count: usize, outcomes: &[DebateOutcome]) -> Self {
        let count = outcomes.len();
        let values = outcomes.iter().map(|o| o.final_valuation);
        let min_valuation = values.clone().fold(f64::INFINITY, f64::min);
        let max_valuation = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let (mean_valuation, mean_turns) = if count == 0 {
            (0.0, 0.0)
        } else {
            // rounding in the sum can push the mean just past an extreme
            let mean = values.sum::<f64>() / count as f64;
            (
                mean.max(min_valuation).min(max_valuation),
                outcomes.iter().map(|o| o.turns as f64).sum::<f64>() / count as f64,
            )
        };

        let mut sorted: Vec<&DebateOutcome> = outcomes.iter().collect();
        sorted.sort_by(|a, b| {
            a.final_valuation
                .partial_cmp(&b.final_valuation)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut groups: Vec<OutcomeGroup> = Vec::new();
        for outcome in sorted {
            match groups.last_mut() {
                Some(group)
                    if (group.final_valuation - outcome.final_valuation).abs()
                        <= SAME_OUTCOME_EPSILON =>
                {
                    group.orderings.push(outcome.ordering_label());
                }
                _ => groups.push(OutcomeGroup {
                    final_valuation: outcome.final_valuation,
                    orderings: vec![outcome.ordering_label()],
                }),
            }
        }

        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            agent_count,
            orderings: count,
            min_valuation: if count == 0 { 0.0 } else { min_valuation },
            max_valuation: if count == 0 { 0.0 } else { max_valuation },
            mean_valuation,
            mean_turns,
            order_sensitive: groups.len() > 1,
            outcomes: groups,
        }
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DebateError::Serialization(format!("summary: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> ArgumentId {
        ArgumentId::from(label)
    }

    fn universe() -> Graph {
        Graph::from_adjacency([
            ("0", vec!["1", "2"]),
            ("1", vec!["3"]),
            ("2", vec![]),
            ("3", vec![]),
        ])
    }

    fn opinion(ug: &Graph, keys: &[&str]) -> Graph {
        let keys: Vec<ArgumentId> = keys.iter().map(|k| id(k)).collect();
        ug.restrict(&keys).unwrap()
    }

    fn experiment(parallel: bool) -> Experiment {
        let ug = universe();
        let opinions = vec![
            opinion(&ug, &["0", "1", "2"]),
            opinion(&ug, &["0", "1", "3"]),
            opinion(&ug, &["0", "2", "3"]),
        ];
        let config = DebateConfig {
            parallel,
            ..DebateConfig::default()
        };
        Experiment::new(ug, opinions, &config).unwrap()
    }

    #[test]
    fn test_every_ordering_is_run() {
        let exp = experiment(false);
        let outcomes = exp.run_all().unwrap();
        assert_eq!(outcomes.len(), 6);
        assert_eq!(outcomes[0].ordering, vec![AgentId(0), AgentId(1), AgentId(2)]);
        for outcome in &outcomes {
            assert!(outcome.final_valuation > 0.0 && outcome.final_valuation <= 1.0);
            assert!(outcome.public_graph.is_subgraph_of(exp.universe()));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = experiment(false).run_all().unwrap();
        let parallel = experiment(true).run_all_parallel().unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_shared_agents_keep_clean_history() {
        let exp = experiment(false);
        exp.run_all().unwrap();
        assert!(exp.agents().iter().all(|a| a.history().is_empty()));
    }

    #[test]
    fn test_unknown_agent_index() {
        let exp = experiment(false);
        assert!(exp.run_ordering(&[0, 7]).is_err());
    }

    #[test]
    fn test_summary_groups_outcomes() {
        let exp = experiment(false);
        let (outcomes, summary) = exp.run().unwrap();

        assert_eq!(summary.orderings, 6);
        assert_eq!(summary.agent_count, 3);
        let grouped: usize = summary.outcomes.iter().map(|g| g.orderings.len()).sum();
        assert_eq!(grouped, outcomes.len());
        assert_eq!(summary.order_sensitive, summary.outcomes.len() > 1);
        assert!(summary.min_valuation <= summary.mean_valuation);
        assert!(summary.mean_valuation <= summary.max_valuation);
        assert!(summary.to_json().unwrap().contains("order_sensitive"));
    }

    #[test]
    fn test_summary_mean_within_extremes() {
        let outcome = DebateOutcome {
            ordering: vec![AgentId(0)],
            final_valuation: 0.4,
            public_graph: Graph::with_issue("0"),
            turns: 1,
            rounds: Vec::new(),
            histories: Vec::new(),
        };
        let outcomes = vec![outcome; 6];

        let summary = ExperimentSummary::from_outcomes(1, &outcomes);
        assert_eq!(summary.min_valuation, 0.4);
        assert_eq!(summary.max_valuation, 0.4);
        assert_eq!(summary.mean_valuation, 0.4);
        assert!(!summary.order_sensitive);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = ExperimentSummary::from_outcomes(0, &[]);
        assert_eq!(summary.orderings, 0);
        assert!(!summary.order_sensitive);
        assert_eq!(summary.min_valuation, 0.0);
    }

    #[test]
    fn test_missing_issue_rejected() {
        let ug = Graph::from_adjacency([("x", Vec::<&str>::new())]);
        assert!(Experiment::new(ug, vec![], &DebateConfig::default()).is_err());
    }
}
