//! Discrete-distribution primitives (spec §4.A).
//!
//! Grounded on `original_source/bayes.cpp`: `pmf2cdf`, `cdf2pmf`, `n_draws`,
//! `random_draw`.

use crate::error::{Error, Result};
use crate::Probability;
use rand::Rng;

/// Tolerance for a PMF's entries summing to (approximately) one.
const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// Tolerance used by [`draw`] to absorb floating-point drift in a
/// cumulative sum that should reach exactly 1.0.
const DRAW_EPSILON: f64 = 1e-8;

/// A probability mass function over `{0, 1, ..., len-1}`.
pub type Pmf = Vec<Probability>;

/// Validate that `p` is a well-formed PMF: no negative entries, sums to
/// 1 within [`NORMALIZATION_TOLERANCE`].
pub fn validate_pmf(p: &[Probability]) -> Result<()> {
    if p.is_empty() {
        return Err(Error::InvalidDistribution("pmf is empty".to_string()));
    }
    if let Some(bad) = p.iter().find(|&&x| x < 0.0 || !x.is_finite()) {
        return Err(Error::InvalidDistribution(format!(
            "pmf has invalid entry {bad}"
        )));
    }
    let sum: f64 = p.iter().sum();
    if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Err(Error::InvalidDistribution(format!(
            "pmf sums to {sum}, expected 1"
        )));
    }
    Ok(())
}

/// Normalize `v` in place to sum to 1. Returns the pre-normalization sum
/// so callers can detect a zero mass (see [`crate::belief::belief_update`]).
pub fn normalize(v: &mut [Probability]) -> Probability {
    let sum: f64 = v.iter().sum();
    if sum > 0.0 {
        for x in v.iter_mut() {
            *x /= sum;
        }
    }
    sum
}

/// Cumulative sum of `p`.
pub fn pmf_to_cdf(p: &[Probability]) -> Vec<Probability> {
    let mut cdf = Vec::with_capacity(p.len());
    let mut running = 0.0;
    for &x in p {
        running += x;
        cdf.push(running);
    }
    cdf
}

/// Inverse of [`pmf_to_cdf`]: first differences of `c`, with `c[0]` as the
/// PMF's first entry.
pub fn cdf_to_pmf(c: &[Probability]) -> Vec<Probability> {
    let mut pmf = Vec::with_capacity(c.len());
    let mut prev = 0.0;
    for &x in c {
        pmf.push(x - prev);
        prev = x;
    }
    pmf
}

/// The PMF of the maximum of `n` i.i.d. draws from `p`.
///
/// `n = 0` returns a unit mass on index 0 (no draws, no improvement).
/// `n = 1` returns `p` unchanged (up to the round-trip through cdf/pmf).
pub fn n_draws(p: &[Probability], n: u32) -> Vec<Probability> {
    if n == 0 {
        let mut unit = vec![0.0; p.len()];
        if !unit.is_empty() {
            unit[0] = 1.0;
        }
        return unit;
    }
    let cdf = pmf_to_cdf(p);
    let raised: Vec<f64> = cdf.iter().map(|&x| x.powi(n as i32)).collect();
    cdf_to_pmf(&raised)
}

/// Sample one index from PMF `p` using `rng`.
///
/// Sums PMF entries until the cumulative mass exceeds a uniform sample in
/// `[0, 1)`, tolerating floating-point drift with [`DRAW_EPSILON`]; if the
/// loop exhausts `p` without crossing the sample (can happen right at the
/// boundary), the last index is returned.
pub fn draw(p: &[Probability], rng: &mut impl Rng) -> usize {
    let r: f64 = rng.random();
    let mut mass = 0.0;
    for (i, &x) in p.iter().enumerate() {
        mass += x;
        if mass + DRAW_EPSILON > r {
            return i;
        }
    }
    p.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn cdf_pmf_round_trip() {
        let p = vec![0.1, 0.2, 0.3, 0.4];
        let c = pmf_to_cdf(&p);
        let back = cdf_to_pmf(&c);
        for (a, b) in p.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn n_draws_zero_is_unit_mass_on_zero() {
        let p = vec![0.2, 0.3, 0.5];
        let out = n_draws(&p, 0);
        assert_eq!(out, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn n_draws_one_is_identity() {
        let p = vec![0.2, 0.3, 0.5];
        let out = n_draws(&p, 1);
        for (a, b) in p.iter().zip(out.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn n_draws_concentrates_toward_tail_with_more_draws() {
        let p = vec![0.5, 0.5];
        let out = n_draws(&p, 5);
        // probability of the max of 5 draws being the top value should
        // dominate a fair coin's single-draw probability.
        assert!(out[1] > p[1]);
    }

    #[test]
    fn validate_pmf_accepts_well_formed() {
        assert!(validate_pmf(&[0.25, 0.25, 0.5]).is_ok());
    }

    #[test]
    fn validate_pmf_rejects_negative_entries() {
        assert!(validate_pmf(&[-0.1, 1.1]).is_err());
    }

    #[test]
    fn validate_pmf_rejects_bad_normalization() {
        assert!(validate_pmf(&[0.1, 0.1]).is_err());
    }

    #[test]
    fn normalize_scales_to_unit_sum() {
        let mut v = vec![2.0, 2.0, 4.0];
        let pre_sum = normalize(&mut v);
        assert_eq!(pre_sum, 8.0);
        let post_sum: f64 = v.iter().sum();
        assert!((post_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_leaves_all_zero_vector_untouched() {
        let mut v = vec![0.0, 0.0, 0.0];
        let pre_sum = normalize(&mut v);
        assert_eq!(pre_sum, 0.0);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn draw_respects_unit_mass() {
        let mut rng = SmallRng::seed_from_u64(42);
        let p = vec![0.0, 1.0, 0.0];
        for _ in 0..50 {
            assert_eq!(draw(&p, &mut rng), 1);
        }
    }

    #[test]
    fn draw_samples_all_support_over_many_trials() {
        let mut rng = SmallRng::seed_from_u64(7);
        let p = vec![0.25, 0.25, 0.25, 0.25];
        let mut seen = [false; 4];
        for _ in 0..2000 {
            seen[draw(&p, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&x| x));
    }
}
