//! Random debate universes and opinions
//!
//! A universe is shaped like an online thread: the issue `0` sits in the
//! middle of a star, and each branch root grows a small random tree whose
//! edges all point back toward it.

use agora_core::{ArgumentId, Graph};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use agora_core::DebateError;

/// Shape of generated universes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fewest branches around the issue
    pub min_branches: usize,
    /// Most branches around the issue (inclusive)
    pub max_branches: usize,
    /// Smallest branch tree, root included
    pub min_tree_size: usize,
    /// Exclusive upper bound on branch tree size
    pub max_tree_size: usize,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_branches: 6,
            max_branches: 15,
            min_tree_size: 1,
            max_tree_size: 6,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> agora_core::Result<()> {
        if self.min_branches == 0 || self.min_branches > self.max_branches {
            return Err(DebateError::InvalidConfig(format!(
                "branch range {}..={} is empty or starts at zero",
                self.min_branches, self.max_branches
            )));
        }
        if self.min_tree_size == 0 || self.min_tree_size >= self.max_tree_size {
            return Err(DebateError::InvalidConfig(format!(
                "tree size range {}..{} is empty or starts at zero",
                self.min_tree_size, self.max_tree_size
            )));
        }
        Ok(())
    }
}

/// Seeded source of universes and opinions
pub struct UniverseGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl UniverseGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a universe with the issue labelled `0`.
    ///
    /// Branch roots are `1..=b`; tree nodes are numbered consecutively
    /// after them, branch by branch.
    pub fn universe(&mut self) -> Result<Graph> {
        let branches = self
            .rng
            .random_range(self.config.min_branches..=self.config.max_branches);

        let mut graph = Graph::with_issue(0usize);
        for root in 1..=branches {
            graph.add_argument(root);
            graph.add_attack(root, 0usize)?;
        }

        let mut next = branches + 1;
        for root in 1..=branches {
            let size = self
                .rng
                .random_range(self.config.min_tree_size..self.config.max_tree_size);

            // random recursive tree: each new node attacks one already in it
            let mut members = vec![root];
            for _ in 1..size {
                let parent = members[self.rng.random_range(0..members.len())];
                graph.add_argument(next);
                graph.add_attack(next, parent)?;
                members.push(next);
                next += 1;
            }
        }

        debug!(
            branches,
            arguments = graph.len(),
            attacks = graph.attack_count(),
            "Generated universe"
        );
        Ok(graph)
    }

    /// Opinion graph holding the issue and between one and `|UG| - 1` other
    /// arguments, drawn uniformly.
    pub fn sample_opinion(&mut self, universe: &Graph, issue: &ArgumentId) -> Result<Graph> {
        sample_opinion(universe, issue, &mut self.rng)
    }

    /// `count` independent opinions
    pub fn sample_opinions(
        &mut self,
        universe: &Graph,
        issue: &ArgumentId,
        count: usize,
    ) -> Result<Vec<Graph>> {
        (0..count)
            .map(|_| self.sample_opinion(universe, issue))
            .collect()
    }
}

/// Draw an opinion graph from `universe` with `rng`.
///
/// A universe holding nothing but the issue yields the issue alone.
pub fn sample_opinion<R: Rng>(
    universe: &Graph,
    issue: &ArgumentId,
    rng: &mut R,
) -> Result<Graph> {
    if !universe.contains(issue) {
        return Err(DebateError::MissingArgument {
            argument: issue.clone(),
        }
        .into());
    }

    let others: Vec<&ArgumentId> = universe.arguments().filter(|a| *a != issue).collect();
    let mut chosen: Vec<&ArgumentId> = if others.is_empty() {
        Vec::new()
    } else {
        let n = rng.random_range(1..=others.len());
        others.choose_multiple(rng, n).copied().collect()
    };
    chosen.push(issue);

    Ok(universe.restrict(chosen)?)
}
