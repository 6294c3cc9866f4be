//! Static-belief value recursion and best-static-action selector
//! (spec §4.D, §4.E).
//!
//! Grounded on `original_source/bayes.cpp::V_static` and
//! `best_static_action`. `pd`, the per-observation posterior matrix, is
//! rebuilt fresh at every recursion depth rather than cached, matching the
//! original (see SPEC_FULL.md "Supplemented behavior").

use crate::dist::normalize;
use crate::kernel::Kernel;
use crate::Value;

/// Expected cumulative improvement value over `k` periods under the
/// policy "keep applying the action behind `kernel`, updating belief from
/// observations between periods" -- excluding server cost.
///
/// `belief` is the current distribution over latent distance; `k` is the
/// number of periods remaining. `k = 0` returns `0`.
pub fn v_static(belief: &[f64], kernel: &Kernel, k: usize) -> Value {
    if k == 0 {
        return 0.0;
    }
    let len = kernel.len();

    // P_i = im . O
    let p_i = kernel.marginal(belief);

    // expected immediate improvement, in index units.
    let value: f64 = p_i.iter().enumerate().map(|(j, &p)| j as f64 * p).sum();

    if k == 1 {
        return value;
    }

    // pd[o', i]: posterior over next-period latent distance o', one
    // column per possible observed improvement i, each normalized.
    let mut pd = vec![vec![0.0; len]; len];
    for i in 0..len {
        let remaining = len - i;
        let mut column = vec![0.0; remaining];
        for (o_prime, slot) in column.iter_mut().enumerate() {
            let o = o_prime + i;
            *slot = kernel.get(i, o) * belief[o];
        }
        normalize(&mut column);
        for (o_prime, &mass) in column.iter().enumerate() {
            pd[i][o_prime] = mass;
        }
    }

    // O' = pd . P_i: marginal-over-observations posterior.
    let mut o_next = vec![0.0; len];
    for (i, &weight) in p_i.iter().enumerate() {
        if weight == 0.0 {
            continue;
        }
        for (o_prime, slot) in o_next.iter_mut().enumerate() {
            *slot += pd[i][o_prime] * weight;
        }
    }

    value + v_static(&o_next, kernel, k - 1)
}

/// Enumerate actions, evaluate [`v_static`] net of cumulative server cost,
/// and return the argmax, ties broken by smallest action index.
pub fn best_static_action(belief: &[f64], kernels: &[Kernel], k: usize, c_server: f64) -> (usize, Value) {
    let mut best_action = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (a, kernel) in kernels.iter().enumerate() {
        let value = v_static(belief, kernel, k) - a as f64 * c_server * k as f64;
        if value > best_value {
            best_value = value;
            best_action = a;
        }
    }
    (best_action, best_value)
}
