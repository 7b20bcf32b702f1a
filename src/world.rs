//! The mutable substrate reactions act on: the reactant arena, binding
//! sites and families, loading/product tables, the cell volume, and the
//! random source. Kept as one struct (rather than threading five
//! parameters through every `rate`/`apply` call) but with no behavior of
//! its own beyond plain field access — the behavior lives in
//! [`crate::reaction::Reaction`], [`crate::solver::Solver`], and friends.

use crate::ids::{FamilyId, SiteId};
use crate::manager::DependencyTable;
use crate::random::RandomSource;
use crate::reactant::ReactantArena;
use crate::site::{BindingSite, BindingSiteFamily};
use crate::table::{LoadingTable, ProductTable};
use crate::validity::ValidityQueue;

pub struct World {
    pub reactants: ReactantArena,
    pub sites: Vec<BindingSite>,
    pub families: Vec<BindingSiteFamily>,
    pub loading_tables: Vec<LoadingTable>,
    pub product_tables: Vec<ProductTable>,
    pub volume: f64,
    pub rng: RandomSource,
}

impl World {
    pub fn new(volume: f64, rng: RandomSource) -> Self {
        World {
            reactants: ReactantArena::new(),
            sites: Vec::new(),
            families: Vec::new(),
            loading_tables: Vec::new(),
            product_tables: Vec::new(),
            volume,
            rng,
        }
    }

    pub fn family(&self, id: FamilyId) -> &BindingSiteFamily {
        &self.families[id.0 as usize]
    }

    pub fn family_mut(&mut self, id: FamilyId) -> &mut BindingSiteFamily {
        &mut self.families[id.0 as usize]
    }

    pub fn site(&self, id: SiteId) -> &BindingSite {
        &self.sites[id.index()]
    }

    /// Applies a k(s) delta from a sequence occupancy change to the
    /// site's owning family, keeping `W = Σ k(s)·a(s)` current, and
    /// notifies every reaction that depends on the site's sequence (any
    /// `SequenceBinding`/`DoubleStrandRecruitment` reaction whose family
    /// has a member site on that sequence) that its rate is stale.
    pub fn propagate_site_change(
        &mut self,
        site: SiteId,
        delta: i64,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) {
        let s = self.site(site);
        let affinity = s.affinity;
        let sequence = s.sequence;
        // A site belongs to exactly one family; find it once at
        // registration time instead of scanning here would need a
        // site->family map, which `site.rs` does not track redundantly —
        // families already store their member site ids, so we scan the
        // (typically small) family list.
        for family in &mut self.families {
            if family.sites.contains(&site) {
                family.notify_k_changed(delta, affinity);
            }
        }
        self.reactants.notify(sequence, deps, queue);
    }
}
