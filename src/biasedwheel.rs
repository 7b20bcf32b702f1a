//! Weighted selector / biased wheel (spec §4.2).
//!
//! Given weights `w[0..n)` with precomputed sum `total = S > 0` and a
//! target `t ∈ [0, S)`, returns the least `i` such that
//! `Σ_{j≤i} w[j] > t`. A weight of zero is never returned. Ties (equal
//! prefix sums) resolve to the left leaf.

use crate::error::{Result, SimError};

/// Returns the least index `i` whose cumulative weight exceeds `target`.
///
/// `total` must be the precomputed sum of `weights` — the caller supplies
/// it so this descent never re-sums the slice itself (spec §4.1: "accept
/// the precomputed S to avoid O(n) re-summation").
pub fn pick(weights: &[f64], target: f64, total: f64) -> Result<usize> {
    if !(total > 0.0) {
        return Err(SimError::Empty);
    }
    let mut cum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cum += w;
        if cum > target {
            return Ok(i);
        }
    }
    // Floating-point rounding may leave `target` a hair below `total`
    // without tripping `cum > target` on the last iteration; fall back to
    // the last nonzero-weight index.
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .ok_or(SimError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_prefix_descent() {
        let w = [1.0, 2.0, 3.0];
        let total = 6.0;
        assert_eq!(pick(&w, 0.0, total).unwrap(), 0);
        assert_eq!(pick(&w, 0.999, total).unwrap(), 0);
        assert_eq!(pick(&w, 1.0, total).unwrap(), 1);
        assert_eq!(pick(&w, 2.999, total).unwrap(), 1);
        assert_eq!(pick(&w, 3.0, total).unwrap(), 2);
        assert_eq!(pick(&w, 5.999, total).unwrap(), 2);
    }

    #[test]
    fn zero_weight_never_returned() {
        let w = [0.0, 5.0, 0.0];
        let total = 5.0;
        for i in 0..100 {
            let t = i as f64 * 0.05;
            assert_eq!(pick(&w, t, total).unwrap(), 1);
        }
    }

    #[test]
    fn empty_distribution_fails() {
        assert_eq!(pick(&[0.0, 0.0, 0.0], 0.0, 0.0), Err(SimError::Empty));
        assert_eq!(pick(&[], 0.0, 0.0), Err(SimError::Empty));
    }
}
