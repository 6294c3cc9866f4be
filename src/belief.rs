//! Bayes belief updater (spec §4.C).
//!
//! Grounded on `original_source/bayes.cpp::belief_update`.

use crate::config::InconsistentObservationPolicy;
use crate::dist::normalize;
use crate::error::{Error, Result};
use crate::kernel::Kernel;
use crate::Probability;

/// Produce the posterior belief over latent distance after observing
/// improvement `improvement`, given a `prior` and the `kernel` for the
/// action that produced the observation.
///
/// Returns a full length-`L` vector, matching the length-`L` belief
/// invariant (spec §3): entries `0..improvement` are zero (those
/// post-update distances are unreachable once `improvement` has been
/// removed), and for each post-update distance `o' in [0, L-1-improvement]`
/// (i.e. index `o' + improvement` of the returned vector):
/// `posterior[o' + improvement] \propto kernel[improvement, o' + improvement] * prior[o' + improvement]`.
///
/// If the normalization constant is zero -- the observation is
/// inconsistent with the prior, which can only happen from floating-point
/// roundoff since `improvement` is always drawn from this same kernel --
/// `policy` decides whether to fall back to a uniform distribution on
/// `[improvement, L-1]` (logging the fallback) or surface
/// `Error::InconsistentObservation` (spec §7, §9 Open Question).
pub fn belief_update(prior: &[Probability], kernel: &Kernel, improvement: usize, policy: InconsistentObservationPolicy) -> Result<Vec<Probability>> {
    let len = kernel.len();
    let remaining = len.saturating_sub(improvement);
    let mut posterior = vec![0.0; len];
    for (o_prime, slot) in posterior[improvement..].iter_mut().enumerate() {
        let o = o_prime + improvement;
        *slot = kernel.get(improvement, o) * prior[o];
    }
    let mass = normalize(&mut posterior[improvement..]);
    if mass <= 0.0 {
        match policy {
            InconsistentObservationPolicy::Surface => {
                return Err(Error::InconsistentObservation { improvement });
            }
            InconsistentObservationPolicy::UniformFallback => {
                log::warn!(
                    "belief_update: zero normalization constant for improvement {improvement}, \
                     falling back to uniform over {remaining} remaining distances"
                );
                if remaining > 0 {
                    let uniform_mass = 1.0 / remaining as f64;
                    posterior[improvement..].iter_mut().for_each(|x| *x = uniform_mass);
                }
            }
        }
    }
    Ok(posterior)
}
