//! Cell-state façade (spec §6, §3 "Entity registry"): the only object the
//! outer world (text parser, CLI, Python bindings) holds.
//!
//! Owns every reactant, reaction, site, family, and table by stable id and
//! offers the narrow registration + advance + read-only-observer surface
//! that an external parser calls back into.

use crate::config::Config;
use crate::error::Result;
use crate::ids::{FamilyId, ReactantId, ReactionId, SiteId};
use crate::manager::DependencyTable;
use crate::random::RandomSource;
use crate::reactant::Reactant;
use crate::reaction::Reaction;
use crate::site::{BindingSite, BindingSiteFamily};
use crate::solver::Solver;
use crate::table::{LoadingTable, ProductTable};
use crate::world::World;

/// Registry of all named entities plus the solver driving them forward
/// (spec §6). `new` builds an empty registry; an external parser then
/// calls the `register_*` methods before the first `perform_next_reaction`.
pub struct CellState {
    pub world: World,
    reactions: Vec<Reaction>,
    names: std::collections::HashMap<String, ReactantId>,
    deps: DependencyTable,
    solver: Solver,
}

impl CellState {
    /// Builds an empty cell state from a [`Config`] (spec §6: volume,
    /// seed, solver/rates/manager variants, initial time).
    pub fn new(config: &Config) -> Self {
        let rng = RandomSource::new_with_seed(config.seed);
        CellState {
            world: World::new(config.volume, rng),
            reactions: Vec::new(),
            names: std::collections::HashMap::new(),
            deps: DependencyTable::new(0),
            solver: Solver::new_single_group(
                0,
                config.manager,
                config.rates,
                config.initial_time,
            ),
        }
    }

    pub fn register_reactant(&mut self, name: impl Into<String>, reactant: Reactant) -> ReactantId {
        let name = name.into();
        let id = self.world.reactants.push(reactant);
        self.names.insert(name, id);
        self.deps.resize(self.world.reactants.len());
        id
    }

    pub fn reactant_id(&self, name: &str) -> Result<ReactantId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| crate::error::SimError::Dependency(name.to_string()))
    }

    pub fn register_site(&mut self, family: FamilyId, site: BindingSite) -> SiteId {
        let id = SiteId::from(self.world.sites.len());
        let (seq, first, last, width) = (site.sequence, site.first, site.last, site.width);
        self.world.sites.push(site);
        self.world.family_mut(family).add_site(id);
        let k = self
            .world
            .reactants
            .with_sequence_occupancy_mut(seq, |occ| occ.register_site(id, first, last, width));
        let affinity = self.world.site(id).affinity;
        self.world.family_mut(family).notify_k_changed(k as i64, affinity);
        id
    }

    pub fn register_family(&mut self) -> FamilyId {
        let id = FamilyId::from(self.world.families.len());
        self.world.families.push(BindingSiteFamily::new());
        id
    }

    pub fn register_loading_table(&mut self, table: LoadingTable) -> usize {
        self.world.loading_tables.push(table);
        self.world.loading_tables.len() - 1
    }

    pub fn register_product_table(&mut self, table: ProductTable) -> usize {
        self.world.product_tables.push(table);
        self.world.product_tables.len() - 1
    }

    /// Registers a reaction, rebuilding the dependency table and growing
    /// the solver's single reaction group to match (spec §9: the graph
    /// variant builds its table by scanning every reaction's declared
    /// reactants once registration is complete).
    pub fn register_reaction(&mut self, reaction: Reaction) -> ReactionId {
        self.reactions.push(reaction);
        let id = ReactionId::from(self.reactions.len() - 1);
        self.rebuild_dependency_table();
        self.solver = Solver::new_single_group(
            self.reactions.len(),
            self.solver.manager_variant(),
            self.solver.container_variant(),
            self.solver.time(),
        );
        self.invalidate_all();
        id
    }

    /// Adds a (forward, backward) reaction pair sharing the same
    /// reactants/products and rate constant (spec §4.6 "Bidirectional
    /// reactions"), returning both ids.
    pub fn register_bidirectional_chemical(
        &mut self,
        reactants: Vec<(ReactantId, u32)>,
        products: Vec<(ReactantId, u32)>,
        k_f: f64,
        k_b: f64,
    ) -> (ReactionId, ReactionId) {
        let forward = self.register_reaction(Reaction::new_chemical(
            reactants.clone(),
            products.clone(),
            k_f,
        ));
        let backward = self.register_reaction(Reaction::new_chemical(products, reactants, k_b));
        (forward, backward)
    }

    fn rebuild_dependency_table(&mut self) {
        self.deps = DependencyTable::build_from_reactions(
            self.world.reactants.len(),
            &self.reactions,
            &self.world,
        );
    }

    fn invalidate_all(&mut self) {
        for i in 0..self.reactions.len() {
            self.solver.invalidate(ReactionId::from(i));
        }
    }

    pub fn perform_next_reaction(&mut self) -> Result<ReactionId> {
        self.solver
            .perform_next_reaction(&self.reactions, &mut self.world, &self.deps)
    }

    pub fn skip(&mut self, delta: f64) -> Result<()> {
        self.solver.skip(delta)
    }

    pub fn next_reaction_time(&mut self) -> Result<(f64, ReactionId)> {
        self.solver.next_reaction_time(&self.reactions, &mut self.world)
    }

    pub fn simulation_time(&self) -> f64 {
        self.solver.time()
    }

    pub fn volume(&self) -> f64 {
        self.world.volume
    }

    pub fn chemical_number(&self, name: &str) -> Result<i64> {
        Ok(self.world.reactants.get(self.reactant_id(name)?).count())
    }

    pub fn chemical_ignored_variation(&self, name: &str) -> Result<i64> {
        Ok(self
            .world
            .reactants
            .get(self.reactant_id(name)?)
            .ignored_variation)
    }

    /// Overwrites a chemical's count directly (spec §6). `visible`
    /// resolves Open Question 1 (spec §9): `true` notifies dependents as
    /// usual; `false` records the delta as ignored variation instead.
    pub fn set_chemical_number(&mut self, name: &str, count: i64, visible: bool) -> Result<()> {
        let id = self.reactant_id(name)?;
        let mut queue = crate::validity::ValidityQueue::new();
        self.world
            .reactants
            .set_free(id, count, visible, &self.deps, &mut queue);
        for r in queue.drain_unique() {
            self.solver.invalidate(r);
        }
        Ok(())
    }

    pub fn set_chemicals(&mut self, values: &[(&str, i64)], visible: bool) -> Result<()> {
        for &(name, count) in values {
            self.set_chemical_number(name, count, visible)?;
        }
        Ok(())
    }

    pub fn reset_ignored_variation(&mut self, name: &str) -> Result<()> {
        let id = self.reactant_id(name)?;
        self.world.reactants.reset_ignored_variation(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::RateContainerVariant;
    use crate::manager::RateManagerVariant;

    fn config() -> Config {
        Config {
            volume: 1.0,
            seed: 1,
            initial_time: 0.0,
            final_time: 100.0,
            output_dir: None,
            solver: crate::solver::SolverVariant::Naive,
            rates: RateContainerVariant::Vector,
            manager: RateManagerVariant::Naive,
            ignored_variation_visible: true,
        }
    }

    #[test]
    fn round_trip_set_and_read_chemical_number() {
        let mut cs = CellState::new(&config());
        cs.register_reactant("A", Reactant::new_free_chemical("A", 0));
        cs.set_chemical_number("A", 42, true).unwrap();
        assert_eq!(cs.chemical_number("A").unwrap(), 42);
    }

    #[test]
    fn perform_next_reaction_advances_time_and_counts() {
        let mut cs = CellState::new(&config());
        let a = cs.register_reactant("A", Reactant::new_free_chemical("A", 5));
        let b = cs.register_reactant("B", Reactant::new_free_chemical("B", 0));
        cs.register_reaction(Reaction::new_chemical(vec![(a, 1)], vec![(b, 1)], 1.0));
        let t0 = cs.simulation_time();
        cs.perform_next_reaction().unwrap();
        assert!(cs.simulation_time() > t0);
        assert_eq!(cs.chemical_number("A").unwrap(), 4);
        assert_eq!(cs.chemical_number("B").unwrap(), 1);
    }

    #[test]
    fn skip_does_not_change_counts() {
        let mut cs = CellState::new(&config());
        cs.register_reactant("A", Reactant::new_free_chemical("A", 5));
        cs.skip(10.0).unwrap();
        assert_eq!(cs.simulation_time(), 10.0);
        assert_eq!(cs.chemical_number("A").unwrap(), 5);
    }

    /// Naive and dependency rate managers must draw the identical
    /// trajectory given the same seed (spec §8 scenario 6): the dependency
    /// manager only changes *how* invalidations reach the queue, never the
    /// resulting rates.
    #[test]
    fn naive_and_dependency_managers_agree_on_trajectory() {
        fn run(manager: RateManagerVariant) -> (f64, i64, i64) {
            let mut cfg = config();
            cfg.seed = 7;
            cfg.manager = manager;
            let mut cs = CellState::new(&cfg);
            let a = cs.register_reactant("A", Reactant::new_free_chemical("A", 20));
            let b = cs.register_reactant("B", Reactant::new_free_chemical("B", 5));
            cs.register_bidirectional_chemical(vec![(a, 1)], vec![(b, 1)], 1.0, 0.5);
            for _ in 0..50 {
                if cs.perform_next_reaction().is_err() {
                    break;
                }
            }
            (
                cs.simulation_time(),
                cs.chemical_number("A").unwrap(),
                cs.chemical_number("B").unwrap(),
            )
        }

        let naive = run(RateManagerVariant::Naive);
        let dependency = run(RateManagerVariant::Dependency);
        assert_eq!(naive, dependency);
    }
}
