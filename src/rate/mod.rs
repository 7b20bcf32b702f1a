//! Rate containers (spec §4.3): three interchangeable structures storing
//! `R` non-negative rates and supporting `set`, `total`, `pick`.

mod flat;
mod hybrid;
mod tree;

pub use flat::FlatRateVector;
pub use hybrid::HybridRateContainer;
pub use tree::RateTree;

use crate::error::Result;

/// Common contract for all rate container implementations.
///
/// `set(i, r)` stores a non-negative rate at index `i`. `total()` returns
/// the sum of all stored rates. `pick(u)` returns an index `i` chosen with
/// probability proportional to its rate, for `u ∈ [0, total())`.
pub trait RateContainer {
    /// Number of reaction slots.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores rate `r` at index `i`. Fails with [`crate::error::SimError::Negative`]
    /// if `r < 0`.
    fn set(&mut self, i: usize, r: f64) -> Result<()>;

    /// Current rate stored at index `i`.
    fn get(&self, i: usize) -> f64;

    /// Sum of all stored rates.
    fn total(&self) -> f64;

    /// Picks an index proportional to its rate. `u` must lie in
    /// `[0, total())`. Fails with [`crate::error::SimError::Empty`] if
    /// `total() == 0`.
    fn pick(&self, u: f64) -> Result<usize>;
}

/// Selects which [`RateContainer`] implementation backs a rate manager,
/// mirroring the `rates` configuration value of spec §6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateContainerVariant {
    Vector,
    Tree,
    Hybrid,
}

/// Builds the container variant selected by `variant`, sized for `n` reactions.
pub fn build(variant: RateContainerVariant, n: usize) -> Box<dyn RateContainer + Send> {
    match variant {
        RateContainerVariant::Vector => Box::new(FlatRateVector::new(n)),
        RateContainerVariant::Tree => Box::new(RateTree::new(n)),
        RateContainerVariant::Hybrid => Box::new(HybridRateContainer::new(n)),
    }
}

#[cfg(test)]
mod conformance {
    //! The same behavioral contract is exercised against all three
    //! implementations, so a bug in one backend cannot silently diverge
    //! from the others (spec I6).
    use super::*;

    fn containers(n: usize) -> Vec<Box<dyn RateContainer>> {
        vec![
            Box::new(FlatRateVector::new(n)),
            Box::new(RateTree::new(n)),
            Box::new(HybridRateContainer::new(n)),
        ]
    }

    #[test]
    fn total_tracks_sum_of_sets() {
        for mut c in containers(4) {
            c.set(0, 1.0).unwrap();
            c.set(1, 2.0).unwrap();
            c.set(2, 0.0).unwrap();
            c.set(3, 3.0).unwrap();
            assert!((c.total() - 6.0).abs() < 1e-9);
            c.set(1, 0.5).unwrap();
            assert!((c.total() - 4.5).abs() < 1e-9);
        }
    }

    #[test]
    fn pick_never_returns_zero_rate_index() {
        for mut c in containers(5) {
            c.set(0, 0.0).unwrap();
            c.set(1, 1.0).unwrap();
            c.set(2, 0.0).unwrap();
            c.set(3, 0.0).unwrap();
            c.set(4, 2.0).unwrap();
            let total = c.total();
            let mut u = 0.0;
            while u < total {
                let i = c.pick(u).unwrap();
                assert!(c.get(i) > 0.0, "picked zero-rate index {i}");
                u += total / 37.0;
            }
        }
    }

    #[test]
    fn negative_rate_rejected() {
        for mut c in containers(2) {
            assert_eq!(
                c.set(0, -1.0),
                Err(crate::error::SimError::Negative)
            );
        }
    }

    #[test]
    fn empty_total_fails_pick() {
        for c in containers(3) {
            assert_eq!(c.pick(0.0), Err(crate::error::SimError::Empty));
        }
    }
}
