//! # Agora IO
//!
//! Files around a debate experiment:
//! - [`apx`]: reading and writing graphs in APX format
//! - [`generator`]: random star-of-trees universes and sampled opinions
//! - [`results`]: numbered `debate_<n>` folders
//! - [`report`]: `orderings.csv` and `turns.csv`
//! - [`source`]: generated or stored debate setups

pub mod apx;
pub mod error;
pub mod generator;
pub mod report;
pub mod results;
pub mod source;

pub use apx::{load_graph, parse_graph, render_graph, save_graph};
pub use error::{IoError, Result};
pub use generator::{sample_opinion, GeneratorConfig, UniverseGenerator};
pub use report::{save_orderings, save_turns, write_orderings, write_turns};
pub use results::ResultsDir;
pub use source::{DebateSetup, DebateSource, GeneratedSource, StoredSource};
