//! Bayesian server-provisioning planner.
//!
//! Given a prior belief over how far the current state is from an unknown
//! optimum, and a per-action stochastic improvement kernel, this crate
//! computes how many servers to provision in each of a finite number of
//! decision periods. Two planners are provided: [`valuation::v_static`], a
//! closed-form dynamic-programming expectation, and [`search::search`], a
//! partially-observable Monte-Carlo tree search (POMCP-style) planner that
//! bootstraps its leaves from the former.
//!
//! The crate is a pure compute kernel: no I/O, no persistence, no network.
//! Callers own the value grid, prior, and likelihood functions, and drive
//! the search with their own RNG.

pub mod belief;
pub mod config;
pub mod dist;
pub mod error;
pub mod kernel;
pub mod mc_eval;
pub mod search;
pub mod tree;
pub mod valuation;

pub use config::{InconsistentObservationPolicy, PlannerConfig, RolloutStrategy};
pub use error::{Error, Result};
pub use kernel::Kernel;

/// dimensional aliases, matching the teacher's top-of-crate convention
/// of naming the quantities that flow through the system: a PMF entry or
/// kernel cell is a [`Probability`], an expected or realized payoff is a
/// [`Value`].
pub type Probability = f64;
pub type Value = f64;

/// trait for constructing arbitrary instances of a type for testing and
/// benchmarking. mirrors the teacher's `Arbitrary` trait.
pub trait Arbitrary {
    fn random() -> Self;
}

impl Arbitrary for Kernel {
    /// A kernel over a random-sized value grid (`4..=12` entries) with a
    /// random server count (`0..=3`), under a uniform likelihood. Used by
    /// fixtures that just need *some* well-formed kernel, not a specific one.
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let len = rng.random_range(4..=12);
        let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let n = rng.random_range(0..=3);
        kernel::build_kernel(&values, |_i, _o| 1.0, n).expect("uniform likelihood over a non-empty grid always builds")
    }
}

/// install a test-local logger once per process. never called from
/// library code outside `#[cfg(test)]` -- a library must not install a
/// global logger on a caller's behalf.
#[cfg(test)]
pub(crate) fn init_test_logger() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
    });
}
