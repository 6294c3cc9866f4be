//! Planner configuration (spec §6).
//!
//! Validated once at construction, in the style of `pt-config`'s
//! validate-on-build rather than checking scattered through the hot path.

use crate::error::{Error, Result};

/// Leaf-evaluation strategy used by [`crate::search::simulate`] when it
/// reaches a frontier observation node (spec §4.F, §9 "Leaf bootstrap
/// versus rollout").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RolloutStrategy {
    /// Bootstrap the leaf value from the closed-form static recursion.
    /// The default, and the only strategy exercised by the correctness
    /// properties in spec §8.
    BootstrapVstatic,
    /// Roll out to the horizon picking actions uniformly at random.
    UniformRandom,
}

impl Default for RolloutStrategy {
    fn default() -> Self {
        RolloutStrategy::BootstrapVstatic
    }
}

/// Policy for handling a zero normalization constant in
/// [`crate::belief::belief_update`] (spec §7 `InconsistentObservation`):
/// "either uniform fallback (default) or surfaced, per policy flag."
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InconsistentObservationPolicy {
    /// Fall back to a uniform distribution over the surviving entries,
    /// logging the fallback. The default.
    UniformFallback,
    /// Surface `Error::InconsistentObservation` to the caller instead of
    /// falling back.
    Surface,
}

impl Default for InconsistentObservationPolicy {
    fn default() -> Self {
        InconsistentObservationPolicy::UniformFallback
    }
}

/// All parameters named in spec §6. `observation_count`, `action_count`,
/// `c_server`, and `horizon` are required (no secret defaults in the
/// core); the rest default to the values spec §6 names but can be
/// overridden with the `with_*` builders.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlannerConfig {
    /// `L`: length of the value grid / size of the observation space.
    pub observation_count: usize,
    /// `A`: number of server-count options; `max_servers = action_count - 1`.
    pub action_count: usize,
    /// per-server per-period cost.
    pub c_server: f64,
    /// `k`: planning horizon in periods.
    pub horizon: usize,
    /// MCTS iterations per `search` call.
    pub n_search: usize,
    /// Monte-Carlo evaluator trajectory count.
    pub n_eval: usize,
    /// UCB1 exploration constant.
    pub ucb_c: f64,
    /// initial visit count seeding a freshly expanded leaf's action nodes.
    pub anode_prior_n: u32,
    /// leaf-evaluation strategy.
    pub rollout_strategy: RolloutStrategy,
    /// policy for a zero-normalization-constant belief update.
    pub inconsistent_observation_policy: InconsistentObservationPolicy,
}

impl PlannerConfig {
    /// Construct a config with the spec §6 defaults for the tunable
    /// parameters, validating the required ones.
    pub fn new(
        observation_count: usize,
        action_count: usize,
        c_server: f64,
        horizon: usize,
    ) -> Result<Self> {
        let config = Self {
            observation_count,
            action_count,
            c_server,
            horizon,
            n_search: 200_000,
            n_eval: 500,
            ucb_c: 25.0,
            anode_prior_n: 100,
            rollout_strategy: RolloutStrategy::BootstrapVstatic,
            inconsistent_observation_policy: InconsistentObservationPolicy::UniformFallback,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_n_search(mut self, n_search: usize) -> Self {
        self.n_search = n_search;
        self
    }

    pub fn with_n_eval(mut self, n_eval: usize) -> Self {
        self.n_eval = n_eval;
        self
    }

    pub fn with_ucb_c(mut self, ucb_c: f64) -> Self {
        self.ucb_c = ucb_c;
        self
    }

    pub fn with_anode_prior_n(mut self, anode_prior_n: u32) -> Self {
        self.anode_prior_n = anode_prior_n;
        self
    }

    pub fn with_rollout_strategy(mut self, strategy: RolloutStrategy) -> Self {
        self.rollout_strategy = strategy;
        self
    }

    pub fn with_inconsistent_observation_policy(mut self, policy: InconsistentObservationPolicy) -> Self {
        self.inconsistent_observation_policy = policy;
        self
    }

    /// `max_servers = action_count - 1`, per §6.
    pub fn max_servers(&self) -> usize {
        self.action_count.saturating_sub(1)
    }

    fn validate(&self) -> Result<()> {
        if self.action_count == 0 {
            return Err(Error::EmptyActionSet);
        }
        if self.observation_count == 0 {
            return Err(Error::InvalidDistribution(
                "observation_count must be >= 1".to_string(),
            ));
        }
        if !self.c_server.is_finite() || self.c_server < 0.0 {
            return Err(Error::InvalidDistribution(
                "c_server must be finite and non-negative".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(Error::InvalidDistribution(
                "horizon must be >= 1".to_string(),
            ));
        }
        if self.n_search == 0 {
            return Err(Error::InvalidDistribution(
                "n_search must be >= 1".to_string(),
            ));
        }
        if self.n_eval == 0 {
            return Err(Error::InvalidDistribution(
                "n_eval must be >= 1".to_string(),
            ));
        }
        if !self.ucb_c.is_finite() || self.ucb_c < 0.0 {
            return Err(Error::InvalidDistribution(
                "ucb_c must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = PlannerConfig::new(5, 3, 0.1, 2).unwrap();
        assert_eq!(config.n_search, 200_000);
        assert_eq!(config.n_eval, 500);
        assert_eq!(config.ucb_c, 25.0);
        assert_eq!(config.anode_prior_n, 100);
        assert_eq!(config.rollout_strategy, RolloutStrategy::BootstrapVstatic);
        assert_eq!(
            config.inconsistent_observation_policy,
            InconsistentObservationPolicy::UniformFallback
        );
        assert_eq!(config.max_servers(), 2);
    }

    #[test]
    fn rejects_empty_action_set() {
        assert_eq!(
            PlannerConfig::new(5, 0, 0.1, 2).unwrap_err(),
            Error::EmptyActionSet
        );
    }

    #[test]
    fn rejects_zero_horizon() {
        assert!(PlannerConfig::new(5, 3, 0.1, 0).is_err());
    }

    #[test]
    fn rejects_negative_cost() {
        assert!(PlannerConfig::new(5, 3, -1.0, 2).is_err());
    }

    #[test]
    fn builders_override_defaults() {
        let config = PlannerConfig::new(5, 3, 0.1, 2)
            .unwrap()
            .with_n_search(10_000)
            .with_ucb_c(5.0)
            .with_rollout_strategy(RolloutStrategy::UniformRandom);
        assert_eq!(config.n_search, 10_000);
        assert_eq!(config.ucb_c, 5.0);
        assert_eq!(config.rollout_strategy, RolloutStrategy::UniformRandom);
    }

    #[test]
    fn inconsistent_observation_policy_is_overridable() {
        let config = PlannerConfig::new(5, 3, 0.1, 2)
            .unwrap()
            .with_inconsistent_observation_policy(InconsistentObservationPolicy::Surface);
        assert_eq!(
            config.inconsistent_observation_policy,
            InconsistentObservationPolicy::Surface
        );
    }
}
