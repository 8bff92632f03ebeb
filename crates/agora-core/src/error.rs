//! Error types for debate operations

use thiserror::Error;

use crate::graph::ArgumentId;

/// Errors raised by graph queries, valuation and the turn protocol.
///
/// None of these are retried: they signal inconsistent input data and abort
/// the current run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DebateError {
    /// A graph was queried for an argument that is not one of its keys
    #[error("Unknown argument: {argument}")]
    UnknownArgument { argument: ArgumentId },

    /// The public graph references an argument absent from the universe
    #[error("Argument {argument} is missing from the universe graph")]
    MissingArgument { argument: ArgumentId },

    /// An opinion graph whose attacks differ from the universe's between
    /// the same arguments
    #[error("Attack {attacker} -> {target} does not match the universe graph")]
    AttackMismatch {
        attacker: ArgumentId,
        target: ArgumentId,
    },

    /// Textual graph input declares an attack before its arguments
    #[error("Malformed graph format at line {line}: {reason}")]
    MalformedGraphFormat { line: usize, reason: String },

    /// Iterative valuation did not settle within the round cap
    #[error("Valuation of {argument} did not converge after {rounds} rounds")]
    NonConvergence { argument: ArgumentId, rounds: usize },

    /// Recursive valuation reached an argument already on the call chain
    #[error("Cycle detected through argument {argument}")]
    CyclicGraph { argument: ArgumentId },

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A report could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, DebateError>;
