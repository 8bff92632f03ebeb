//! Where a debate's universe and opinions come from

use agora_core::{ArgumentId, DebateError, Graph};
use tracing::info;

use crate::error::Result;
use crate::generator::UniverseGenerator;
use crate::results::ResultsDir;

/// A universe together with one opinion graph per agent
#[derive(Debug, Clone, PartialEq)]
pub struct DebateSetup {
    pub universe: Graph,
    pub opinions: Vec<Graph>,
}

impl DebateSetup {
    /// Check that the issue is in the universe and every opinion is a
    /// subgraph of it holding the issue
    pub fn validate(&self, issue: &ArgumentId) -> Result<()> {
        self.universe.validate()?;
        if !self.universe.contains(issue) {
            return Err(DebateError::MissingArgument {
                argument: issue.clone(),
            }
            .into());
        }
        for opinion in &self.opinions {
            if !opinion.contains(issue) {
                return Err(DebateError::MissingArgument {
                    argument: issue.clone(),
                }
                .into());
            }
            opinion.check_subgraph_of(&self.universe)?;
        }
        Ok(())
    }
}

/// Trait for debate setup providers
pub trait DebateSource {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Produce a validated setup for `issue`
    fn load(&mut self, issue: &ArgumentId) -> Result<DebateSetup>;
}

/// Fresh random universe and `agents` sampled opinions
pub struct GeneratedSource {
    generator: UniverseGenerator,
    agents: usize,
}

impl GeneratedSource {
    pub fn new(generator: UniverseGenerator, agents: usize) -> Self {
        Self { generator, agents }
    }
}

impl DebateSource for GeneratedSource {
    fn name(&self) -> &str {
        "generated"
    }

    fn load(&mut self, issue: &ArgumentId) -> Result<DebateSetup> {
        let universe = self.generator.universe()?;
        let opinions = self.generator.sample_opinions(&universe, issue, self.agents)?;
        let setup = DebateSetup { universe, opinions };
        setup.validate(issue)?;
        info!(
            source = self.name(),
            arguments = setup.universe.len(),
            agents = setup.opinions.len(),
            "Debate setup ready"
        );
        Ok(setup)
    }
}

/// Graphs saved in a results folder
pub struct StoredSource {
    dir: ResultsDir,
}

impl StoredSource {
    pub fn new(dir: ResultsDir) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &ResultsDir {
        &self.dir
    }
}

impl DebateSource for StoredSource {
    fn name(&self) -> &str {
        "stored"
    }

    fn load(&mut self, issue: &ArgumentId) -> Result<DebateSetup> {
        let universe = self.dir.load_universe()?;
        let opinions = self.dir.load_opinions()?;
        let setup = DebateSetup { universe, opinions };
        setup.validate(issue)?;
        info!(
            source = self.name(),
            path = %self.dir.path().display(),
            arguments = setup.universe.len(),
            agents = setup.opinions.len(),
            "Debate setup ready"
        );
        Ok(setup)
    }
}
