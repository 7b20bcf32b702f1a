//! Rate manager (spec §4.4): drains the rate-validity queue and keeps a
//! rate container's stored rates consistent with `reaction.rate()`.
//!
//! The three manager variants (naive, dependency, graph) differ only in
//! *how* invalidations reach the queue, not in how the queue is drained —
//! both the dependency and graph variants consult the same
//! `reactant_id -> [reaction_id]` lookup table (spec §9's single
//! dependency table, replacing per-reactant observer lists). The graph
//! variant builds that table once, in a single scan of every reaction's
//! declared reactants at registration time; the dependency variant builds
//! it incrementally as each reaction is registered. Once built the two are
//! indistinguishable, which is exactly the correctness equivalence spec §8
//! scenario 6 checks for.

use crate::ids::{ReactantId, ReactionId};
use crate::rate::{RateContainer, RateContainerVariant};
use crate::reaction::Reaction;
use crate::validity::ValidityQueue;
use crate::world::World;
use crate::Result;

/// `reactant_id -> [reaction_id]`: which reactions must be re-invalidated
/// when a given reactant changes.
#[derive(Clone, Debug, Default)]
pub struct DependencyTable {
    dependents: Vec<Vec<ReactionId>>,
}

impl DependencyTable {
    pub fn new(n_reactants: usize) -> Self {
        DependencyTable {
            dependents: vec![Vec::new(); n_reactants],
        }
    }

    pub fn resize(&mut self, n_reactants: usize) {
        self.dependents.resize(n_reactants, Vec::new());
    }

    pub fn add_edge(&mut self, reactant: ReactantId, reaction: ReactionId) {
        self.dependents[reactant.index()].push(reaction);
    }

    pub fn dependents_of(&self, reactant: ReactantId) -> &[ReactionId] {
        &self.dependents[reactant.index()]
    }

    /// Builds the table in one pass by scanning every reaction's declared
    /// reactant list (the "graph" construction style of spec §4.4).
    pub fn build_from_reactions(n_reactants: usize, reactions: &[Reaction], world: &World) -> Self {
        let mut table = DependencyTable::new(n_reactants);
        for (i, reaction) in reactions.iter().enumerate() {
            for r in reaction.reactants(world) {
                table.add_edge(r, ReactionId::from(i));
            }
        }
        table
    }
}

/// Which invalidation-generation strategy a rate manager uses (spec §6
/// `manager` configuration value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateManagerVariant {
    Naive,
    Dependency,
    Graph,
}

/// Owns a rate container and the validity queue, and keeps the former
/// consistent with the latter on `update()` (spec §4.4).
pub struct RateManager {
    variant: RateManagerVariant,
    container: Box<dyn RateContainer + Send>,
    queue: ValidityQueue,
}

impl RateManager {
    pub fn new(variant: RateManagerVariant, container_variant: RateContainerVariant, n: usize) -> Self {
        RateManager {
            variant,
            container: crate::rate::build(container_variant, n),
            queue: ValidityQueue::new(),
        }
    }

    pub fn variant(&self) -> RateManagerVariant {
        self.variant
    }

    pub fn invalidate(&mut self, i: ReactionId) {
        self.queue.invalidate(i);
    }

    pub fn queue_mut(&mut self) -> &mut ValidityQueue {
        &mut self.queue
    }

    /// Drains the validity queue, recomputing and storing each affected
    /// reaction's rate. The naive variant ignores the queue's contents and
    /// recomputes every reaction instead (spec §4.4: "used as a
    /// correctness baseline").
    pub fn update(&mut self, reactions: &[Reaction], world: &World) -> Result<()> {
        match self.variant {
            RateManagerVariant::Naive => {
                self.queue.drain_unique();
                for (i, reaction) in reactions.iter().enumerate() {
                    self.container.set(i, reaction.rate(world))?;
                }
            }
            RateManagerVariant::Dependency | RateManagerVariant::Graph => {
                for id in self.queue.drain_unique() {
                    let r = reactions[id.index()].rate(world);
                    self.container.set(id.index(), r)?;
                }
            }
        }
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.container.total()
    }

    pub fn pick(&self, u: f64) -> Result<usize> {
        self.container.pick(u)
    }

    pub fn get(&self, i: usize) -> f64 {
        self.container.get(i)
    }

    pub fn reinvalidate(&mut self, i: ReactionId) {
        self.queue.invalidate(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ReactantId;
    use crate::random::RandomSource;
    use crate::reaction::Reaction;

    #[test]
    fn dependency_table_from_reactions() {
        let reactions = vec![Reaction::new_chemical(
            vec![(ReactantId(0), 1)],
            vec![(ReactantId(1), 1)],
            1.0,
        )];
        let world = World::new(1.0, RandomSource::new_with_seed(1));
        let table = DependencyTable::build_from_reactions(2, &reactions, &world);
        assert_eq!(table.dependents_of(ReactantId(0)), &[ReactionId(0)]);
        assert!(table.dependents_of(ReactantId(1)).is_empty());
    }
}
