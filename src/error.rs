//! Structured errors for the planning core (see spec §7).
//!
//! Scoped to the five error kinds the core actually recognizes; no
//! error-code/category/remediation machinery is carried over from the
//! CLI-facing pattern this is grounded on (`pt-common::error::Error`),
//! since this crate has no CLI.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors the planning core can surface to a caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A supplied PMF had negative entries or didn't normalize within
    /// tolerance.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A belief update's normalization constant was zero. Surfaced only
    /// when [`crate::config::InconsistentObservationPolicy::Surface`] is
    /// selected; under the default
    /// [`crate::config::InconsistentObservationPolicy::UniformFallback`]
    /// this is instead logged and absorbed.
    #[error("inconsistent observation: improvement {improvement} incompatible with belief")]
    InconsistentObservation { improvement: usize },

    /// The action space was empty (`A = 0`); the core refuses to search.
    #[error("empty action set: action_count must be >= 1")]
    EmptyActionSet,

    /// The planning horizon was exhausted (`k = 0`). Never escapes a
    /// public API -- every recursion bottoms out by returning zero
    /// directly rather than constructing this variant -- but it is
    /// named here so the five error kinds in spec §7 are all represented
    /// in the type.
    #[error("horizon exhausted: no periods remaining")]
    HorizonExhausted,

    /// A Monte-Carlo evaluator could not locate a matching child node
    /// after a bounded number of targeted-simulation resamples.
    #[error("convergence failure: no child found for improvement {improvement} after {attempts} resamples")]
    ConvergenceFailure { improvement: usize, attempts: usize },
}
