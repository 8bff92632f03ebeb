//! # Agora Core
//!
//! Debate engine for studying how speaking order shapes the outcome of a
//! debate over an argumentation graph:
//! - [`Graph`]: argument → attackers mapping, with [`Graph::restrict`] as the
//!   single construction primitive
//! - [`valuation()`]: belief strength `1 / (1 + Σ attackers)`, iterative or
//!   recursive
//! - [`Agent`]: comfort zone and best-move search over its opinion graph
//! - [`run_protocol`] / [`Experiment`]: turn loop to a fixed point, replayed
//!   under every speaking order
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_core::{Agent, AgentConfig, AgentId, ArgumentId, Graph, Valuator, run_protocol};
//!
//! let universe = Graph::from_adjacency([
//!     ("0", vec!["1", "2"]),
//!     ("1", vec![]),
//!     ("2", vec![]),
//! ]);
//! let issue = ArgumentId::from("0");
//! let opinion = universe.restrict(universe.arguments()).unwrap();
//! let agent = Agent::new(AgentId(0), issue.clone(), opinion, &universe, AgentConfig::default()).unwrap();
//!
//! let mut agents = vec![agent];
//! let outcome = run_protocol(&universe, &issue, &mut agents, &Valuator::default()).unwrap();
//! assert!((outcome.final_valuation - 1.0 / 3.0).abs() < 1e-9);
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod experiment;
pub mod graph;
pub mod protocol;
pub mod valuation;

pub use agent::{Agent, AgentConfig, AgentId, History};
pub use config::{DebateConfig, TieBreak, DEFAULT_COMFORT};
pub use error::{DebateError, Result};
pub use experiment::{Experiment, ExperimentSummary, OutcomeGroup};
pub use graph::{ArgumentId, Graph, ReverseIndex};
pub use protocol::{
    all_orderings, ordering_count, ordering_label, run_protocol, DebateOutcome, DebateRound,
    Orderings,
};
pub use valuation::{
    iterative_valuation, iterative_valuations, recursive_valuation, valuation, ValuationCache,
    ValuationStrategy, Valuations, Valuator,
};
