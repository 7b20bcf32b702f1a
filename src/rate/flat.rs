//! Flat vector rate container — the reference implementation (spec §4.3).
//!
//! `O(1)` set, `O(R)` pick and total recompute. Kept simple on purpose: it
//! is the correctness baseline the tree and hybrid containers are checked
//! against.

use super::RateContainer;
use crate::biasedwheel;
use crate::error::{Result, SimError};

#[derive(Clone, Debug)]
pub struct FlatRateVector {
    rates: Vec<f64>,
}

impl FlatRateVector {
    pub fn new(n: usize) -> Self {
        FlatRateVector { rates: vec![0.0; n] }
    }
}

impl RateContainer for FlatRateVector {
    fn len(&self) -> usize {
        self.rates.len()
    }

    fn set(&mut self, i: usize, r: f64) -> Result<()> {
        if r < 0.0 {
            return Err(SimError::Negative);
        }
        self.rates[i] = r;
        Ok(())
    }

    fn get(&self, i: usize) -> f64 {
        self.rates[i]
    }

    fn total(&self) -> f64 {
        self.rates.iter().sum()
    }

    fn pick(&self, u: f64) -> Result<usize> {
        biasedwheel::pick(&self.rates, u, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut c = FlatRateVector::new(3);
        c.set(1, 4.5).unwrap();
        assert_eq!(c.get(1), 4.5);
        assert_eq!(c.get(0), 0.0);
    }
}
