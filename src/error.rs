//! Error taxonomy for the recommendation core.
//!
//! Configuration problems are fatal at fit time; malformed requests
//! (dimension / arm / unknown decision id) are rejected without touching any
//! learning state; `NotFitted` indicates a startup-ordering bug in the caller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// Bad fit-time setup (empty training set, empty field lists, bad arms).
    #[error("configuration error: {0}")]
    Config(String),

    /// Context vector length differs from the fitted dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The arm is not in the declared arm set.
    #[error("invalid arm: {0} is not a declared price tier")]
    InvalidArm(f64),

    /// Decision id unknown or already consumed.
    #[error("decision {0} not found")]
    NotFound(uuid::Uuid),

    /// Engine used before `fit`.
    #[error("engine not fitted")]
    NotFitted,
}
