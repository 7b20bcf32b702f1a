//! Binding sites and binding-site families (spec §3 Binding site /
//! Binding site family, §4.8).
//!
//! A [`BindingSite`] is a pure data record — composition over the source's
//! deep inheritance hierarchy (spec §9). The per-family aggregation (the
//! cached weighted sum and weighted pick) lives in [`BindingSiteFamily`],
//! a separate structure rather than a site subclass.

use crate::error::{Result, SimError};
use crate::ids::{ReactantId, SiteId};
use crate::random::RandomSource;

#[derive(Clone, Debug)]
pub struct BindingSite {
    pub sequence: ReactantId,
    pub first: u64,
    pub last: u64,
    pub width: u64,
    pub frame: u8,
    pub affinity: f64,
}

/// A weighted pool of binding sites, searchable as a single unit.
///
/// Maintains `W = Σ_s k(s)·a(s)` as a running sum, updated incrementally
/// whenever a member site's k(s) changes (spec §4.8), rather than
/// recomputed from scratch on every query.
#[derive(Clone, Debug, Default)]
pub struct BindingSiteFamily {
    pub sites: Vec<SiteId>,
    w: f64,
}

impl BindingSiteFamily {
    pub fn new() -> Self {
        BindingSiteFamily::default()
    }

    pub fn add_site(&mut self, site: SiteId) {
        self.sites.push(site);
    }

    pub fn total_weight(&self) -> f64 {
        self.w
    }

    /// Applies a k(s) change of `delta` for a member site with affinity `a`.
    pub fn notify_k_changed(&mut self, delta: i64, affinity: f64) {
        self.w += delta as f64 * affinity;
    }

    /// Picks a site weighted by `k(s)·a(s)`, given each member's current
    /// `k(s)·a(s)` contribution in `weights` (same order as `self.sites`).
    /// Fails with `EmptyFamily` (surfaced as [`SimError::Empty`]) when
    /// `W == 0`.
    pub fn weighted_pick(&self, weights: &[f64], rng: &mut RandomSource) -> Result<SiteId> {
        if !(self.w > 0.0) {
            return Err(SimError::Empty);
        }
        let idx = rng.weighted_index(weights, self.w)?;
        Ok(self.sites[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_tracks_incremental_k_changes() {
        let mut family = BindingSiteFamily::new();
        family.add_site(SiteId(0));
        family.add_site(SiteId(1));
        family.notify_k_changed(8, 1.0);
        family.notify_k_changed(5, 2.0);
        assert!((family.total_weight() - 18.0).abs() < 1e-9);
        family.notify_k_changed(-3, 1.0);
        assert!((family.total_weight() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn empty_family_fails_pick() {
        let family = BindingSiteFamily::new();
        let mut rng = RandomSource::new_with_seed(1);
        assert_eq!(
            family.weighted_pick(&[], &mut rng),
            Err(SimError::Empty)
        );
    }
}
