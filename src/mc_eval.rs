//! Monte-Carlo evaluators, out-of-tree (spec §4.G).
//!
//! Grounded on `original_source/utc.cpp`'s two evaluator routines; the
//! belief tracking during the tree-greedy evaluator is the history-induced
//! reconstruction mandated by §4.F/§9 (the source's two variants disagree
//! on this point, which §9 flags as unresolved upstream).

use crate::belief::belief_update;
use crate::config::PlannerConfig;
use crate::dist::draw;
use crate::error::{Error, Result};
use crate::kernel::Kernel;
use crate::search::{root_argmax, simulate};
use crate::tree::Tree;
use crate::valuation::best_static_action;
use rand::Rng;

/// Visit-count threshold below which [`mc_utc`] invests extra simulation
/// before trusting the greedy action at an onode.
const VISIT_THRESHOLD: u32 = 100;

/// Extra `Simulate` calls per round once the threshold is tripped.
const EXTRA_SIMULATIONS: usize = 100;

/// Resample the observation after this many failed attempts to locate a
/// matching child; give up after [`MAX_RESAMPLE_ATTEMPTS`] total attempts.
const RESAMPLE_EVERY: usize = 100;
const MAX_RESAMPLE_ATTEMPTS: usize = 1000;

/// Default trajectory count for [`v_dynamic_mc`] (spec §4.G); distinct
/// from `PlannerConfig::n_eval`'s default of 500, which governs
/// [`mc_utc`].
pub const DEFAULT_V_DYNAMIC_MC_TRAJECTORIES: usize = 1000;

/// Tree-greedy evaluator (`MC_utc`): repeats `n_trajectories` trajectories,
/// each descending `tree` by the max-`V` action at every onode, growing the
/// tree with extra simulation when a branch is under-visited or a sampled
/// observation has no matching child yet. Returns the per-trajectory
/// realized value.
pub fn mc_utc(
    tree: &mut Tree,
    prior: &[f64],
    kernels: &[Kernel],
    config: &PlannerConfig,
    n_trajectories: usize,
    rng: &mut impl Rng,
) -> Result<Vec<f64>> {
    let mut results = Vec::with_capacity(n_trajectories);

    for _ in 0..n_trajectories {
        let mut state = draw(prior, rng);
        let mut h = tree.root();
        let mut k = config.horizon;
        let mut total = 0.0;

        while k > 0 {
            if tree.onode(h).children.is_empty() {
                simulate(tree, h, state, prior, k, kernels, config, rng)?;
            }
            let (action, _) = root_argmax(tree, h).expect("expanded node has children");
            let anode_id = tree.onode(h).children[&action];

            if tree.anode(anode_id).visits < VISIT_THRESHOLD {
                for _ in 0..EXTRA_SIMULATIONS {
                    let belief_h = tree.belief_along_history(h, prior, kernels, config.inconsistent_observation_policy)?;
                    let sim_state = draw(&belief_h, rng);
                    simulate(tree, h, sim_state, prior, k, kernels, config, rng)?;
                }
            }

            let mut observed = draw(kernels[action].column(state), rng);
            let mut attempts = 0usize;
            let next_onode = loop {
                if let Some(&child) = tree.anode(anode_id).children.get(&observed) {
                    break child;
                }
                if attempts >= MAX_RESAMPLE_ATTEMPTS {
                    return Err(Error::ConvergenceFailure {
                        improvement: observed,
                        attempts,
                    });
                }
                let belief_h = tree.belief_along_history(h, prior, kernels, config.inconsistent_observation_policy)?;
                let sim_state = draw(&belief_h, rng);
                simulate(tree, h, sim_state, prior, k, kernels, config, rng)?;
                attempts += 1;
                if attempts % RESAMPLE_EVERY == 0 {
                    observed = draw(kernels[action].column(state), rng);
                }
            };

            total += observed as f64 - action as f64 * config.c_server;
            state = state.saturating_sub(observed);
            h = next_onode;
            k -= 1;
        }

        results.push(total);
    }

    Ok(results)
}

/// Dynamic-Bayes evaluator (`V_dynamic_MC`): repeats `n_trajectories`
/// trajectories, recomputing the best static action from the current
/// belief at every period, sampling an outcome, and updating belief.
/// Returns the mean realized value.
pub fn v_dynamic_mc(prior: &[f64], kernels: &[Kernel], config: &PlannerConfig, n_trajectories: usize, rng: &mut impl Rng) -> Result<f64> {
    let mut total = 0.0;
    for _ in 0..n_trajectories {
        let mut belief = prior.to_vec();
        let mut state = draw(prior, rng);
        let mut remaining = config.horizon;
        let mut trajectory_value = 0.0;

        while remaining > 0 {
            let (action, _) = best_static_action(&belief, kernels, remaining, config.c_server);
            let improvement = draw(kernels[action].column(state), rng);
            trajectory_value += improvement as f64 - action as f64 * config.c_server;
            state = state.saturating_sub(improvement);
            belief = belief_update(&belief, &kernels[action], improvement, config.inconsistent_observation_policy)?;
            remaining -= 1;
        }

        total += trajectory_value;
    }
    Ok(total / n_trajectories as f64)
}
