//! Reactants (spec §3): named quantities with integer counts, observed by
//! reactions whose rate depends on them.
//!
//! Per spec §9's re-architecture note, there is no per-reactant dynamic
//! observer list at runtime. Instead a single dependency table
//! (`reactant_id -> [reaction_id]`, see [`crate::manager::DependencyTable`])
//! is consulted whenever a reactant mutates, and the affected reaction
//! indices are pushed into the [`crate::validity::ValidityQueue`].

use crate::ids::{ReactantId, SiteId};
use crate::manager::DependencyTable;
use crate::occupancy::SequenceOccupancy;
use crate::validity::ValidityQueue;

/// A single binder occupying a footprint on a sequence (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundUnit {
    pub sequence: ReactantId,
    pub position: u64,
    pub frame: u8,
}

#[derive(Clone, Debug)]
pub enum ReactantKind {
    /// Count only.
    FreeChemical { count: i64 },
    /// A multiset of bound units; count = `units.len()`.
    BoundChemical { units: Vec<BoundUnit> },
    /// An immutable-length polymer with mutable occupancy.
    ChemicalSequence {
        length: u64,
        occupancy: SequenceOccupancy,
    },
}

#[derive(Clone, Debug)]
pub struct Reactant {
    pub name: String,
    pub kind: ReactantKind,
    /// Count overwritten by `set_chemical_number` that dependent
    /// observers configured to *not* see did not propagate (spec §6,
    /// Open Question 1). Reset by `reset_ignored_variation`.
    pub ignored_variation: i64,
}

impl Reactant {
    pub fn new_free_chemical(name: impl Into<String>, count: i64) -> Self {
        Reactant {
            name: name.into(),
            kind: ReactantKind::FreeChemical { count },
            ignored_variation: 0,
        }
    }

    pub fn new_bound_chemical(name: impl Into<String>) -> Self {
        Reactant {
            name: name.into(),
            kind: ReactantKind::BoundChemical { units: Vec::new() },
            ignored_variation: 0,
        }
    }

    pub fn new_sequence(name: impl Into<String>, length: u64) -> Self {
        Reactant {
            name: name.into(),
            kind: ReactantKind::ChemicalSequence {
                length,
                occupancy: SequenceOccupancy::new(length),
            },
            ignored_variation: 0,
        }
    }

    /// Current count, however the reactant represents it (spec §3 base
    /// Reactant: "a named quantity with integer count").
    pub fn count(&self) -> i64 {
        match &self.kind {
            ReactantKind::FreeChemical { count } => *count,
            ReactantKind::BoundChemical { units } => units.len() as i64,
            ReactantKind::ChemicalSequence { .. } => 1,
        }
    }
}

/// Flat arena of all reactants, indexed by stable [`ReactantId`].
#[derive(Clone, Debug, Default)]
pub struct ReactantArena {
    reactants: Vec<Reactant>,
}

impl ReactantArena {
    pub fn new() -> Self {
        ReactantArena {
            reactants: Vec::new(),
        }
    }

    pub fn push(&mut self, reactant: Reactant) -> ReactantId {
        self.reactants.push(reactant);
        ReactantId::from(self.reactants.len() - 1)
    }

    pub fn get(&self, id: ReactantId) -> &Reactant {
        &self.reactants[id.index()]
    }

    pub fn get_mut(&mut self, id: ReactantId) -> &mut Reactant {
        &mut self.reactants[id.index()]
    }

    pub fn len(&self) -> usize {
        self.reactants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reactant> {
        self.reactants.iter()
    }

    /// Notifies the dependency table that `id` changed, pushing its
    /// dependent reactions into `queue` (spec §4.9: synchronous,
    /// before returning control to the caller).
    pub fn notify(&self, id: ReactantId, deps: &DependencyTable, queue: &mut ValidityQueue) {
        for &reaction in deps.dependents_of(id) {
            queue.invalidate(reaction);
        }
    }

    /// Adds `delta` to a free chemical's count and notifies dependents.
    pub fn add_free(
        &mut self,
        id: ReactantId,
        delta: i64,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) {
        if let ReactantKind::FreeChemical { count } = &mut self.get_mut(id).kind {
            *count += delta;
        }
        self.notify(id, deps, queue);
    }

    /// Overwrites a free chemical's count directly (spec §6
    /// `set_chemical_number`), tracking the portion dependents configured
    /// to ignore would have missed.
    pub fn set_free(
        &mut self,
        id: ReactantId,
        value: i64,
        visible: bool,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) {
        let reactant = self.get_mut(id);
        let delta = if let ReactantKind::FreeChemical { count } = &mut reactant.kind {
            let delta = value - *count;
            *count = value;
            delta
        } else {
            0
        };
        if visible {
            self.notify(id, deps, queue);
        } else {
            self.get_mut(id).ignored_variation += delta;
        }
    }

    pub fn reset_ignored_variation(&mut self, id: ReactantId) {
        self.get_mut(id).ignored_variation = 0;
    }

    /// Adds a bound unit to a bound chemical and notifies dependents.
    pub fn add_bound_unit(
        &mut self,
        id: ReactantId,
        unit: BoundUnit,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) {
        if let ReactantKind::BoundChemical { units } = &mut self.get_mut(id).kind {
            units.push(unit);
        }
        self.notify(id, deps, queue);
    }

    /// Removes one bound unit matching `pred`, returning it if found.
    pub fn remove_bound_unit(
        &mut self,
        id: ReactantId,
        pred: impl Fn(&BoundUnit) -> bool,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) -> Option<BoundUnit> {
        let removed = if let ReactantKind::BoundChemical { units } = &mut self.get_mut(id).kind {
            units.iter().position(pred).map(|i| units.remove(i))
        } else {
            None
        };
        if removed.is_some() {
            self.notify(id, deps, queue);
        }
        removed
    }

    /// Mutates the occupancy of a sequence reactant through `f`. Does not
    /// itself notify dependents — occupancy changes return a per-site k(s)
    /// delta that the caller feeds to
    /// [`crate::world::World::propagate_site_change`], which is what
    /// actually notifies the reactions depending on this sequence (see
    /// [`crate::site`]).
    pub fn with_sequence_occupancy_mut<T>(
        &mut self,
        id: ReactantId,
        f: impl FnOnce(&mut SequenceOccupancy) -> T,
    ) -> T {
        match &mut self.get_mut(id).kind {
            ReactantKind::ChemicalSequence { occupancy, .. } => f(occupancy),
            _ => panic!("reactant {id:?} is not a sequence"),
        }
    }

    pub fn sequence_length(&self, id: ReactantId) -> u64 {
        match &self.get(id).kind {
            ReactantKind::ChemicalSequence { length, .. } => *length,
            _ => panic!("reactant {id:?} is not a sequence"),
        }
    }

    pub fn site_free_count(&self, seq: ReactantId, site: SiteId) -> u64 {
        match &self.get(seq).kind {
            ReactantKind::ChemicalSequence { occupancy, .. } => occupancy.free_count(site),
            _ => panic!("reactant {seq:?} is not a sequence"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_chemical_count_round_trips() {
        let mut arena = ReactantArena::new();
        let deps = DependencyTable::new(1);
        let mut queue = ValidityQueue::new();
        let id = arena.push(Reactant::new_free_chemical("A", 10));
        arena.add_free(id, -3, &deps, &mut queue);
        assert_eq!(arena.get(id).count(), 7);
    }

    #[test]
    fn ignored_variation_tracks_invisible_overwrite() {
        let mut arena = ReactantArena::new();
        let deps = DependencyTable::new(0);
        let mut queue = ValidityQueue::new();
        let id = arena.push(Reactant::new_free_chemical("A", 10));
        arena.set_free(id, 4, false, &deps, &mut queue);
        assert_eq!(arena.get(id).count(), 4);
        assert_eq!(arena.get(id).ignored_variation, -6);
        assert!(queue.is_empty());
        arena.reset_ignored_variation(id);
        assert_eq!(arena.get(id).ignored_variation, 0);
    }
}
