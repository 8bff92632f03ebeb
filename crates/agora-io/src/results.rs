//! Results folders
//!
//! Each experiment gets its own `debate_<n>` folder under a base directory,
//! numbered one past the highest existing folder.

use std::fs;
use std::path::{Path, PathBuf};

use agora_core::{ExperimentSummary, Graph};
use tracing::info;

use crate::apx::{self, EXTENSION};
use crate::error::{IoError, Result};

const FOLDER_PREFIX: &str = "debate_";

pub const UNIVERSE_FILE: &str = "universe_graph.apx";
pub const ORDERINGS_FILE: &str = "orderings.csv";
pub const TURNS_FILE: &str = "turns.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// One experiment's folder and its canonical file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsDir {
    root: PathBuf,
}

impl ResultsDir {
    /// Create the next free `debate_<n>` folder under `base`, creating
    /// `base` if needed.
    pub fn create_next(base: &Path) -> Result<Self> {
        fs::create_dir_all(base)?;
        let next = Self::highest_index(base)? + 1;
        let root = base.join(format!("{FOLDER_PREFIX}{next}"));
        fs::create_dir(&root)?;
        info!(path = %root.display(), "Created results folder");
        Ok(Self { root })
    }

    /// Open an existing folder
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            )));
        }
        Ok(Self { root })
    }

    /// Highest `n` among `debate_<n>` children of `base`, 0 if none
    fn highest_index(base: &Path) -> Result<u32> {
        let mut highest = 0;
        for entry in fs::read_dir(base)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let index = name
                .to_str()
                .and_then(|n| n.strip_prefix(FOLDER_PREFIX))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(index) = index {
                highest = highest.max(index);
            }
        }
        Ok(highest)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn universe_path(&self) -> PathBuf {
        self.root.join(UNIVERSE_FILE)
    }

    /// `agent_<k>.apx`
    pub fn agent_path(&self, k: usize) -> PathBuf {
        self.root.join(format!("agent_{k}.{EXTENSION}"))
    }

    pub fn orderings_path(&self) -> PathBuf {
        self.root.join(ORDERINGS_FILE)
    }

    pub fn turns_path(&self) -> PathBuf {
        self.root.join(TURNS_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn save_universe(&self, universe: &Graph) -> Result<()> {
        apx::save_graph(&self.universe_path(), universe)
    }

    /// Write `agent_0.apx`, `agent_1.apx`, ...
    pub fn save_opinions(&self, opinions: &[Graph]) -> Result<()> {
        for (k, opinion) in opinions.iter().enumerate() {
            apx::save_graph(&self.agent_path(k), opinion)?;
        }
        Ok(())
    }

    pub fn load_universe(&self) -> Result<Graph> {
        apx::load_graph(&self.universe_path())
    }

    /// Load `agent_0.apx`, `agent_1.apx`, ... up to the first missing index
    pub fn load_opinions(&self) -> Result<Vec<Graph>> {
        let mut opinions = Vec::new();
        loop {
            let path = self.agent_path(opinions.len());
            if !path.exists() {
                break;
            }
            opinions.push(apx::load_graph(&path)?);
        }
        Ok(opinions)
    }

    pub fn save_summary(&self, summary: &ExperimentSummary) -> Result<()> {
        let path = self.summary_path();
        if path.exists() {
            return Err(IoError::AlreadyExists(path));
        }
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        Ok(())
    }
}
