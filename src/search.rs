//! PO-MCTS search driver (spec §4.F, §5 concurrency addition).
//!
//! Grounded on `original_source/utc.cpp::Simulate`/`Search`, with the
//! UCB1 constant and `n = 0` kernel-builder fix already applied upstream
//! in [`crate::kernel`] rather than here (§9 Open Questions).

use crate::config::{PlannerConfig, RolloutStrategy};
use crate::dist::draw;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::tree::{ONodeId, Tree};
use crate::valuation::v_static;
use rand::Rng;

/// Run one PO-MCTS episode from sampled latent state `state`, starting at
/// observation node `h`, with `k` periods remaining. Returns the episode's
/// realized (possibly simulated) total value `R`, mutating `tree` with the
/// new nodes and back-propagated statistics.
pub fn simulate(
    tree: &mut Tree,
    h: ONodeId,
    state: usize,
    prior: &[f64],
    k: usize,
    kernels: &[Kernel],
    config: &PlannerConfig,
    rng: &mut impl Rng,
) -> Result<f64> {
    if k == 0 {
        return Ok(0.0);
    }

    if tree.onode(h).children.is_empty() {
        let belief_h = tree.belief_along_history(h, prior, kernels, config.inconsistent_observation_policy)?;
        let mut leaf_value = f64::NEG_INFINITY;
        for a in 0..config.action_count {
            let action_value = evaluate_leaf(a, &belief_h, state, k, kernels, config, rng);
            let anode = tree.push_anode(h, a, config.anode_prior_n, action_value);
            tree.onode_mut(h).children.insert(a, anode);
            if action_value > leaf_value {
                leaf_value = action_value;
            }
        }
        return Ok(leaf_value);
    }

    let a_star = ucb1_select(tree, h, config.ucb_c);
    let anode_id = *tree.onode(h).children.get(&a_star).expect("expanded leaf has all actions");

    let column = kernels[a_star].column(state);
    let improvement = draw(column, rng);
    let next_state = state.saturating_sub(improvement);
    let immediate = improvement as f64 - a_star as f64 * config.c_server;

    let child = match tree.anode(anode_id).children.get(&improvement) {
        Some(&id) => id,
        None => {
            let id = tree.push_onode(anode_id, improvement);
            tree.anode_mut(anode_id).children.insert(improvement, id);
            id
        }
    };

    let r = immediate + simulate(tree, child, next_state, prior, k - 1, kernels, config, rng)?;

    tree.onode_mut(h).visits += 1;
    let anode = tree.anode_mut(anode_id);
    anode.visits += 1;
    anode.value += (r - anode.value) / anode.visits as f64;

    Ok(r)
}

/// `evaluate_leaf`: the single extension point named in §9, dispatching
/// on [`RolloutStrategy`].
fn evaluate_leaf(
    action: usize,
    belief_h: &[f64],
    state: usize,
    k: usize,
    kernels: &[Kernel],
    config: &PlannerConfig,
    rng: &mut impl Rng,
) -> f64 {
    match config.rollout_strategy {
        RolloutStrategy::BootstrapVstatic => v_static(belief_h, &kernels[action], k),
        RolloutStrategy::UniformRandom => rollout(action, state, k, kernels, config.c_server, rng),
    }
}

/// Uniform-random rollout to the horizon: take `action` this period, then
/// pick actions uniformly at random for the remaining periods, collecting
/// `Sigma (i_t - a_t * c_server)`.
fn rollout(action: usize, state: usize, k: usize, kernels: &[Kernel], c_server: f64, rng: &mut impl Rng) -> f64 {
    let mut total = 0.0;
    let mut state = state;
    let mut current_action = action;
    for t in 0..k {
        if t > 0 {
            current_action = rng.random_range(0..kernels.len());
        }
        let improvement = draw(kernels[current_action].column(state), rng);
        total += improvement as f64 - current_action as f64 * c_server;
        state = state.saturating_sub(improvement);
    }
    total
}

/// UCB1 selection over an expanded observation node's children.
fn ucb1_select(tree: &Tree, h: ONodeId, ucb_c: f64) -> usize {
    let onode = tree.onode(h);
    let log_n = ((onode.visits + 1) as f64).ln();
    let mut best_action = 0;
    let mut best_score = f64::NEG_INFINITY;
    let mut actions: Vec<_> = onode.children.keys().copied().collect();
    actions.sort_unstable();
    for action in actions {
        let anode = tree.anode(onode.children[&action]);
        let exploration = ucb_c * (log_n / (anode.visits + 1) as f64).sqrt();
        let score = anode.value + exploration;
        if score > best_score {
            best_score = score;
            best_action = action;
        }
    }
    best_action
}

/// Current argmax action at `root`, ties broken by smallest action index.
/// `None` if the root has not yet been expanded.
pub fn root_argmax(tree: &Tree, root: ONodeId) -> Option<(usize, f64)> {
    let onode = tree.onode(root);
    let mut actions: Vec<_> = onode.children.keys().copied().collect();
    actions.sort_unstable();
    let mut best: Option<(usize, f64)> = None;
    for action in actions {
        let value = tree.anode(onode.children[&action]).value;
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((action, value)),
        }
    }
    best
}

/// Run `Search(k, prior, {im_a})`: allocate a root and perform
/// `config.n_search` episodes, recording the current root argmax value
/// after each iteration. Returns the final argmax, the tree, and the
/// convergence trace.
pub fn search(prior: &[f64], kernels: &[Kernel], config: &PlannerConfig, rng: &mut impl Rng) -> Result<(usize, f64, Tree, Vec<f64>)> {
    let mut tree = Tree::new();
    let root = tree.root();
    let mut trace = Vec::with_capacity(config.n_search);

    for iteration in 0..config.n_search {
        let state = draw(prior, rng);
        simulate(&mut tree, root, state, prior, config.horizon, kernels, config, rng)?;

        let (_, value) = root_argmax(&tree, root).unwrap_or((0, 0.0));
        trace.push(value);

        if iteration % 1000 == 0 {
            log::debug!("search: iteration {iteration}, root value {value}");
        }
    }

    let (best_action, best_value) = root_argmax(&tree, root).unwrap_or((0, 0.0));
    Ok((best_action, best_value, tree, trace))
}

/// Sharded parallel search (§5, SPEC_FULL.md "Concurrency addition"):
/// grows `shards` independent trees, each running `n_search / shards`
/// sequential episodes with its own seeded PRNG, then reduces the
/// per-action root statistics (`N` summed, `V` combined as the
/// `N`-weighted mean) into one result.
#[cfg(feature = "parallel")]
pub fn search_parallel(
    prior: &[f64],
    kernels: &[Kernel],
    config: &PlannerConfig,
    base_seed: u64,
    shards: Option<usize>,
) -> Result<(usize, f64)> {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rayon::prelude::*;

    let shards = shards.unwrap_or_else(num_cpus::get).max(1);
    let per_shard = (config.n_search / shards).max(1);
    let mut shard_config = config.clone();
    shard_config.n_search = per_shard;

    let per_shard_stats: Vec<Vec<(u32, f64)>> = (0..shards)
        .into_par_iter()
        .map(|shard_index| {
            let mut rng = SmallRng::seed_from_u64(base_seed.wrapping_add(shard_index as u64));
            let (_, _, tree, _) = search(prior, kernels, &shard_config, &mut rng)?;
            let root = tree.root();
            let onode = tree.onode(root);
            Ok((0..config.action_count)
                .map(|action| match onode.children.get(&action) {
                    Some(&anode_id) => {
                        let anode = tree.anode(anode_id);
                        (anode.visits, anode.value)
                    }
                    None => (0, 0.0),
                })
                .collect())
        })
        .collect::<Result<Vec<Vec<(u32, f64)>>>>()?;

    let mut best_action = 0;
    let mut best_value = f64::NEG_INFINITY;
    for action in 0..config.action_count {
        let mut total_n: u64 = 0;
        let mut weighted_sum = 0.0;
        for shard in &per_shard_stats {
            let (n, v) = shard[action];
            total_n += n as u64;
            weighted_sum += n as f64 * v;
        }
        let combined_value = if total_n > 0 { weighted_sum / total_n as f64 } else { 0.0 };
        if combined_value > best_value {
            best_value = combined_value;
            best_action = action;
        }
    }

    Ok((best_action, best_value))
}
