//! Solver (spec §4.10): next-reaction time and identity, time advance,
//! event dispatch.
//!
//! Reaction classification (spec §4.10, "constant-rate group" vs
//! "updated-rate groups") is an optimization only — the solver picks a
//! group proportional to the group's total rate, then a reaction inside
//! it, which is statistically identical to picking directly from one flat
//! container. [`Solver`] always holds at least one group; callers that do
//! not need classification get a single group spanning every reaction.

use tracing::{debug, trace};

use crate::biasedwheel;
use crate::error::{Result, SimError};
use crate::event::EventSchedule;
use crate::ids::ReactionId;
use crate::manager::{DependencyTable, RateManager, RateManagerVariant};
use crate::rate::RateContainerVariant;
use crate::reaction::{ApplyOutcome, Reaction};
use crate::validity::ValidityQueue;
use crate::world::World;

/// Solver state machine (spec §4.7): `Idle` before the first drain,
/// `Ready` between steps, `Stepping` while an `apply()` is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SolverState {
    Idle,
    Ready,
    Stepping,
}

/// Which solver dispatch style is selected (spec §6 `solver` configuration
/// value). Both end up calling the same step logic below; `naive` skips
/// reaction classification into groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverVariant {
    Naive,
    ManualDispatch,
}

/// A set of reactions whose rates are tracked together in one
/// [`RateManager`] (spec §4.10 reaction classification).
pub struct ReactionGroup {
    /// Global reaction indices belonging to this group, in group-local
    /// order (group-local index `j` <-> `members[j]`).
    pub members: Vec<ReactionId>,
    pub manager: RateManager,
}

pub struct Solver {
    state: SolverState,
    pub groups: Vec<ReactionGroup>,
    /// global reaction index -> (group index, group-local index)
    membership: Vec<(usize, usize)>,
    pub events: EventSchedule,
    time: f64,
    manager_variant: RateManagerVariant,
    container_variant: RateContainerVariant,
}

impl Solver {
    /// Builds a solver with a single group spanning every reaction.
    pub fn new_single_group(
        n_reactions: usize,
        manager_variant: RateManagerVariant,
        container_variant: RateContainerVariant,
        initial_time: f64,
    ) -> Self {
        let members: Vec<ReactionId> = (0..n_reactions).map(ReactionId::from).collect();
        let membership = (0..n_reactions).map(|i| (0usize, i)).collect();
        Solver {
            state: SolverState::Idle,
            groups: vec![ReactionGroup {
                members,
                manager: RateManager::new(manager_variant, container_variant, n_reactions),
            }],
            membership,
            events: EventSchedule::new(),
            time: initial_time,
            manager_variant,
            container_variant,
        }
    }

    pub fn manager_variant(&self) -> RateManagerVariant {
        self.manager_variant
    }

    pub fn container_variant(&self) -> RateContainerVariant {
        self.container_variant
    }

    /// Builds a solver with reactions partitioned by `group_of(reaction)`
    /// into distinct classification groups (spec §4.10).
    pub fn new_classified(
        n_reactions: usize,
        group_of: impl Fn(usize) -> usize,
        n_groups: usize,
        manager_variant: RateManagerVariant,
        container_variant: RateContainerVariant,
        initial_time: f64,
    ) -> Self {
        let mut members: Vec<Vec<ReactionId>> = vec![Vec::new(); n_groups];
        let mut membership = vec![(0usize, 0usize); n_reactions];
        for i in 0..n_reactions {
            let g = group_of(i);
            let local = members[g].len();
            members[g].push(ReactionId::from(i));
            membership[i] = (g, local);
        }
        let groups = members
            .into_iter()
            .map(|members| ReactionGroup {
                manager: RateManager::new(manager_variant, container_variant, members.len()),
                members,
            })
            .collect();
        Solver {
            state: SolverState::Idle,
            groups,
            membership,
            events: EventSchedule::new(),
            time: initial_time,
            manager_variant,
            container_variant,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn invalidate(&mut self, reaction: ReactionId) {
        let (g, local) = self.membership[reaction.index()];
        self.groups[g].manager.invalidate(ReactionId::from(local));
    }

    /// Drains a queue of global reaction ids (as produced by
    /// [`Reaction::apply`] and [`EventSchedule::fire_up_to`], which know
    /// nothing about classification groups) into each id's owning group.
    fn route(&mut self, global: &mut ValidityQueue) {
        for id in global.take_pending() {
            self.invalidate(id);
        }
    }

    fn drain(&mut self, reactions: &[Reaction], world: &World) -> Result<()> {
        for group in &mut self.groups {
            let local_reactions: Vec<Reaction> =
                group.members.iter().map(|&id| reactions[id.index()].clone()).collect();
            group.manager.update(&local_reactions, world)?;
        }
        self.state = SolverState::Ready;
        Ok(())
    }

    fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.manager.total()).sum()
    }

    /// Picks a global reaction index proportional to its rate, across all
    /// groups (spec §4.10).
    fn pick(&self, u: f64) -> Result<ReactionId> {
        let group_totals: Vec<f64> = self.groups.iter().map(|g| g.manager.total()).collect();
        let g = biasedwheel::pick(&group_totals, u, self.total())?;
        let mut remaining = u;
        for &t in &group_totals[..g] {
            remaining -= t;
        }
        let local = self.groups[g].manager.pick(remaining)?;
        Ok(self.groups[g].members[local])
    }

    /// Draws `Δt` and a reaction identity without applying it.
    pub fn next_reaction_time(
        &mut self,
        reactions: &[Reaction],
        world: &mut World,
    ) -> Result<(f64, ReactionId)> {
        self.drain(reactions, world)?;
        let total = self.total();
        if !(total > 0.0) {
            return Err(SimError::NoReaction);
        }
        let dt = world.rng.exponential(total);
        let u = world.rng.uniform() * total;
        let reaction = self.pick(u)?;
        Ok((dt, reaction))
    }

    /// Advances time by exactly `delta` without firing a reaction (spec
    /// §4.10 `skip`, used for warm-up). Invalid if a scheduled event would
    /// have fired strictly before `t + delta`.
    pub fn skip(&mut self, delta: f64) -> Result<()> {
        let target = self.time + delta;
        if let Some(next_event) = self.events.peek_time() {
            if next_event < target {
                return Err(SimError::Format(
                    "skip would jump past a pending scheduled event".into(),
                ));
            }
        }
        self.time = target;
        trace!(time = self.time, "skip");
        Ok(())
    }

    /// Draws and applies the next reaction (spec §4.10
    /// `perform_next_reaction`).
    pub fn perform_next_reaction(
        &mut self,
        reactions: &[Reaction],
        world: &mut World,
        deps: &DependencyTable,
    ) -> Result<ReactionId> {
        self.state = SolverState::Stepping;
        let (dt, reaction_id) = self.next_reaction_time(reactions, world)?;
        self.time += dt;
        debug!(reaction = reaction_id.0, time = self.time, "firing");
        let mut global = ValidityQueue::new();
        let outcome = reactions[reaction_id.index()].apply(world, deps, &mut global);
        self.route(&mut global);
        if outcome == ApplyOutcome::NoEffect {
            self.invalidate(reaction_id);
        }
        self.events
            .fire_up_to(self.time, &mut world.reactants, deps, &mut global);
        self.route(&mut global);
        self.state = SolverState::Ready;
        Ok(reaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomSource;
    use crate::reactant::Reactant;

    #[test]
    fn skip_advances_time_exactly() {
        let mut solver =
            Solver::new_single_group(0, RateManagerVariant::Naive, RateContainerVariant::Vector, 0.0);
        solver.skip(10.0).unwrap();
        assert_eq!(solver.time(), 10.0);
    }

    #[test]
    fn no_reaction_when_total_rate_zero() {
        let mut world = World::new(1.0, RandomSource::new_with_seed(1));
        world.reactants.push(Reactant::new_free_chemical("A", 0));
        let reactions = vec![];
        let mut solver =
            Solver::new_single_group(0, RateManagerVariant::Naive, RateContainerVariant::Vector, 0.0);
        let err = solver.next_reaction_time(&reactions, &mut world).unwrap_err();
        assert_eq!(err, SimError::NoReaction);
    }
}
