//! Error taxonomy for model generation
//!
//! Three failure classes exist, all fatal to a run:
//! - configuration problems, detected before any entity is created
//! - unresolvable references, which indicate a generator defect
//! - serialization failures, reported with the offending entity
//!
//! Generation is deterministic for a given seed, so nothing here is retried.

use thiserror::Error;

/// Main error type for a generation run
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unresolvable reference: {0}")]
    Unresolvable(#[from] UnresolvableReference),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

/// Out-of-range or contradictory configuration bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("'{field}' must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("Inverted bounds for '{field}': min {min} > max {max}")]
    InvertedBounds {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("Invalid range for '{field}': [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("'{field}' must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("{interfaces} interface(s) cannot satisfy {needed} distinct roles per component")]
    InsufficientInterfaces { interfaces: usize, needed: usize },

    #[error("'{field}' must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// A generator produced a handle to an entity that does not exist (yet).
///
/// Never the result of randomness; always a defect in generation order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{entity}' references missing {reference}")]
pub struct UnresolvableReference {
    pub entity: String,
    pub reference: String,
}

/// The entity graph cannot be rendered
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Declaration cycle through '{entity}'")]
    Cycle { entity: String },

    #[error("'{entity}' references '{reference}' before it is declared")]
    ForwardReference { entity: String, reference: String },

    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type GenerationResult<T> = Result<T, GenerationError>;
