//! Reactions (spec §4.6, §9): a tagged variant in place of the source's
//! virtual-dispatch reaction base class. Every variant exposes `rate()`,
//! `apply()`, `reactants()`, and `products()`; the rate manager and solver
//! only ever call these four methods, dispatch on the variant is known at
//! registration time.

use crate::ids::{FamilyId, ReactantId};
use crate::manager::DependencyTable;
use crate::reactant::{BoundUnit, ReactantKind};
use crate::validity::ValidityQueue;
use crate::world::World;

/// Outcome of applying a reaction. A reaction whose rate was actually zero
/// at apply time (numerical drift, or every candidate bound unit refused
/// its move) is a no-op: time still advances, but nothing changed and the
/// reaction must be re-invalidated (spec §4.11).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    NoEffect,
}

/// Distinct sequence reactant ids that a family's member sites live on.
fn family_sequences(world: &World, family: FamilyId) -> Vec<ReactantId> {
    let mut seqs: Vec<ReactantId> = world
        .family(family)
        .sites
        .iter()
        .map(|&s| world.site(s).sequence)
        .collect();
    seqs.sort();
    seqs.dedup();
    seqs
}

fn falling_factorial(n: i64, nu: u32) -> f64 {
    if n < nu as i64 {
        return 0.0;
    }
    let mut acc = 1.0;
    for i in 0..nu as i64 {
        acc *= (n - i) as f64;
    }
    acc
}

#[derive(Clone, Debug)]
pub struct ChemicalReaction {
    pub reactants: Vec<(ReactantId, u32)>,
    pub products: Vec<(ReactantId, u32)>,
    pub k_f: f64,
}

#[derive(Clone, Debug)]
pub struct SequenceBindingReaction {
    pub free: ReactantId,
    pub family: FamilyId,
    pub bound: ReactantId,
    pub width: u64,
    pub k: f64,
}

#[derive(Clone, Debug)]
pub struct TranslocationReaction {
    pub bound: ReactantId,
    pub width: u64,
    pub step: u64,
    pub k: f64,
}

#[derive(Clone, Debug)]
pub struct LoadingReaction {
    pub bound: ReactantId,
    pub table: usize,
    pub k: f64,
}

#[derive(Clone, Debug)]
pub struct ReleaseReaction {
    pub bound: ReactantId,
    pub width: u64,
    pub product_table: usize,
    pub k: f64,
}

#[derive(Clone, Debug)]
pub struct DoubleStrandRecruitmentReaction {
    pub free: ReactantId,
    pub family: FamilyId,
    pub bound: ReactantId,
    pub partner: ReactantId,
    pub width: u64,
    pub k: f64,
}

#[derive(Clone, Debug)]
pub enum Reaction {
    Chemical(ChemicalReaction),
    SequenceBinding(SequenceBindingReaction),
    Translocation(TranslocationReaction),
    Loading(LoadingReaction),
    Release(ReleaseReaction),
    DoubleStrandRecruitment(DoubleStrandRecruitmentReaction),
}

impl Reaction {
    pub fn new_chemical(
        reactants: Vec<(ReactantId, u32)>,
        products: Vec<(ReactantId, u32)>,
        k_f: f64,
    ) -> Self {
        Reaction::Chemical(ChemicalReaction {
            reactants,
            products,
            k_f,
        })
    }

    /// All reactants this reaction's rate depends on, or whose count it
    /// mutates — the declared list the dependency/graph managers scan to
    /// build the dependency table (spec §4.4). `SequenceBinding` and
    /// `DoubleStrandRecruitment` rates read `family.total_weight()`, which
    /// changes whenever occupancy changes on any sequence one of the
    /// family's member sites lives on, so those sequences' reactant ids
    /// are declared dependencies too — otherwise a bind/unbind/translocate
    /// elsewhere on the same sequence would never re-invalidate this
    /// reaction under the dependency/graph managers.
    pub fn reactants(&self, world: &World) -> Vec<ReactantId> {
        match self {
            Reaction::Chemical(r) => r.reactants.iter().map(|(id, _)| *id).collect(),
            Reaction::SequenceBinding(r) => {
                let mut ids = vec![r.free, r.bound];
                ids.extend(family_sequences(world, r.family));
                ids
            }
            Reaction::Translocation(r) => vec![r.bound],
            Reaction::Loading(r) => vec![r.bound],
            Reaction::Release(r) => vec![r.bound],
            Reaction::DoubleStrandRecruitment(r) => {
                let mut ids = vec![r.free, r.bound, r.partner];
                ids.extend(family_sequences(world, r.family));
                ids
            }
        }
    }

    pub fn products(&self) -> Vec<ReactantId> {
        match self {
            Reaction::Chemical(r) => r.products.iter().map(|(id, _)| *id).collect(),
            Reaction::SequenceBinding(r) => vec![r.bound],
            Reaction::Translocation(r) => vec![r.bound],
            Reaction::Loading(r) => vec![r.bound],
            Reaction::Release(r) => vec![r.bound],
            Reaction::DoubleStrandRecruitment(r) => vec![r.bound],
        }
    }

    /// Pure function of the current state of this reaction's reactants
    /// (spec §3). Never mutates `world`.
    pub fn rate(&self, world: &World) -> f64 {
        match self {
            Reaction::Chemical(r) => {
                let sum_nu: i64 = r.reactants.iter().map(|(_, nu)| *nu as i64).sum();
                let mut rate = r.k_f * world.volume.powi(1 - sum_nu as i32);
                for &(id, nu) in &r.reactants {
                    rate *= falling_factorial(world.reactants.get(id).count(), nu);
                }
                rate
            }
            Reaction::SequenceBinding(r) => {
                let free = world.reactants.get(r.free).count().max(0) as f64;
                free * r.k * world.family(r.family).total_weight()
            }
            Reaction::Translocation(r) => r.k * world.reactants.get(r.bound).count().max(0) as f64,
            Reaction::Loading(r) => r.k * world.reactants.get(r.bound).count().max(0) as f64,
            Reaction::Release(r) => r.k * world.reactants.get(r.bound).count().max(0) as f64,
            Reaction::DoubleStrandRecruitment(r) => {
                let free = world.reactants.get(r.free).count().max(0) as f64;
                let partner = world.reactants.get(r.partner).count().max(0) as f64;
                free * partner * r.k * world.family(r.family).total_weight()
            }
        }
    }

    /// Mutates `world`'s reactants. Valid only when `rate() > 0`; a
    /// variant may still discover at apply time that no candidate could
    /// actually move (translocation stalling, an exhausted loading table
    /// entry) and report [`ApplyOutcome::NoEffect`] instead of panicking.
    pub fn apply(
        &self,
        world: &mut World,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) -> ApplyOutcome {
        match self {
            Reaction::Chemical(r) => {
                for &(id, nu) in &r.reactants {
                    world.reactants.add_free(id, -(nu as i64), deps, queue);
                }
                for &(id, nu) in &r.products {
                    world.reactants.add_free(id, nu as i64, deps, queue);
                }
                ApplyOutcome::Applied
            }
            Reaction::SequenceBinding(r) => {
                apply_binding(world, deps, queue, r.free, r.family, r.bound, r.width)
            }
            Reaction::DoubleStrandRecruitment(r) => {
                apply_binding(world, deps, queue, r.free, r.family, r.bound, r.width)
            }
            Reaction::Translocation(r) => apply_translocation(world, deps, queue, r),
            Reaction::Loading(r) => apply_loading(world, deps, queue, r),
            Reaction::Release(r) => apply_release(world, deps, queue, r),
        }
    }
}

fn apply_binding(
    world: &mut World,
    deps: &DependencyTable,
    queue: &mut ValidityQueue,
    free: ReactantId,
    family_id: FamilyId,
    bound: ReactantId,
    width: u64,
) -> ApplyOutcome {
    let member_sites = world.family(family_id).sites.clone();
    if member_sites.is_empty() {
        return ApplyOutcome::NoEffect;
    }
    let weights: Vec<f64> = member_sites
        .iter()
        .map(|&s| {
            let site = world.site(s).clone();
            let k = world
                .reactants
                .with_sequence_occupancy_mut(site.sequence, |occ| occ.free_count(s));
            k as f64 * site.affinity
        })
        .collect();
    let total_w: f64 = weights.iter().sum();
    if !(total_w > 0.0) {
        return ApplyOutcome::NoEffect;
    }
    let Ok(idx) = world.rng.weighted_index(&weights, total_w) else {
        return ApplyOutcome::NoEffect;
    };
    let site_id = member_sites[idx];
    let site = world.site(site_id).clone();
    let offsets = world
        .reactants
        .with_sequence_occupancy_mut(site.sequence, |occ| occ.free_offsets(site_id));
    if offsets.is_empty() {
        return ApplyOutcome::NoEffect;
    }
    let idx = (world.rng.uniform() * offsets.len() as f64) as usize;
    let offset = offsets[idx.min(offsets.len() - 1)];
    let changes = world
        .reactants
        .with_sequence_occupancy_mut(site.sequence, |occ| {
            occ.bind(offset, offset + width - 1)
        })
        .expect("offset was free by construction");
    for (changed_site, delta) in changes {
        world.propagate_site_change(changed_site, delta, deps, queue);
    }
    world.reactants.add_free(free, -1, deps, queue);
    world.reactants.add_bound_unit(
        bound,
        BoundUnit {
            sequence: site.sequence,
            position: offset,
            frame: 0,
        },
        deps,
        queue,
    );
    ApplyOutcome::Applied
}

fn apply_translocation(
    world: &mut World,
    deps: &DependencyTable,
    queue: &mut ValidityQueue,
    r: &TranslocationReaction,
) -> ApplyOutcome {
    let units = match &world.reactants.get(r.bound).kind {
        ReactantKind::BoundChemical { units } => units.clone(),
        _ => return ApplyOutcome::NoEffect,
    };
    if units.is_empty() {
        return ApplyOutcome::NoEffect;
    }
    let start = (world.rng.uniform() * units.len() as f64) as usize;
    for offset in 0..units.len() {
        let unit = units[(start + offset) % units.len()];
        let length = world.reactants.sequence_length(unit.sequence);
        let new_pos = unit.position + r.step;
        if new_pos + r.width > length {
            continue; // would exit the sequence
        }
        // A move is refused (stalling) unless the destination footprint,
        // excluding the unit's own current footprint, is entirely free.
        let destination_clear = world.reactants.with_sequence_occupancy_mut(unit.sequence, |occ| {
            occ.unbind(unit.position, unit.position + r.width - 1)
                .map(|freed| (occ.is_free(new_pos, new_pos + r.width - 1), freed))
        });
        let Ok((clear, freed)) = destination_clear else {
            continue;
        };
        if !clear {
            world.reactants.with_sequence_occupancy_mut(unit.sequence, |occ| {
                let _ = occ.bind(unit.position, unit.position + r.width - 1);
            });
            continue;
        }
        for (s, d) in freed {
            world.propagate_site_change(s, d, deps, queue);
        }
        let occupied = world
            .reactants
            .with_sequence_occupancy_mut(unit.sequence, |occ| {
                occ.bind(new_pos, new_pos + r.width - 1)
            })
            .expect("destination checked free");
        for (s, d) in occupied {
            world.propagate_site_change(s, d, deps, queue);
        }
        world.reactants.remove_bound_unit(r.bound, |u| *u == unit, deps, queue);
        world.reactants.add_bound_unit(
            r.bound,
            BoundUnit {
                position: new_pos,
                ..unit
            },
            deps,
            queue,
        );
        return ApplyOutcome::Applied;
    }
    ApplyOutcome::NoEffect
}

fn apply_loading(
    world: &mut World,
    deps: &DependencyTable,
    queue: &mut ValidityQueue,
    r: &LoadingReaction,
) -> ApplyOutcome {
    let units = match &world.reactants.get(r.bound).kind {
        ReactantKind::BoundChemical { units } => units.clone(),
        _ => return ApplyOutcome::NoEffect,
    };
    if units.is_empty() {
        return ApplyOutcome::NoEffect;
    }
    let idx = (world.rng.uniform() * units.len() as f64) as usize;
    let unit = units[idx.min(units.len() - 1)];
    let Some(consumed) = world.loading_tables[r.table].lookup(unit.position) else {
        return ApplyOutcome::NoEffect;
    };
    if world.reactants.get(consumed).count() <= 0 {
        return ApplyOutcome::NoEffect;
    }
    world.reactants.add_free(consumed, -1, deps, queue);
    world.reactants.remove_bound_unit(r.bound, |u| *u == unit, deps, queue);
    world.reactants.add_bound_unit(
        r.bound,
        BoundUnit {
            frame: unit.frame + 1,
            position: unit.position + 1,
            ..unit
        },
        deps,
        queue,
    );
    ApplyOutcome::Applied
}

fn apply_release(
    world: &mut World,
    deps: &DependencyTable,
    queue: &mut ValidityQueue,
    r: &ReleaseReaction,
) -> ApplyOutcome {
    let units = match &world.reactants.get(r.bound).kind {
        ReactantKind::BoundChemical { units } => units.clone(),
        _ => return ApplyOutcome::NoEffect,
    };
    if units.is_empty() {
        return ApplyOutcome::NoEffect;
    }
    let idx = (world.rng.uniform() * units.len() as f64) as usize;
    let unit = units[idx.min(units.len() - 1)];
    world.reactants.remove_bound_unit(r.bound, |u| *u == unit, deps, queue);
    let changes = world
        .reactants
        .with_sequence_occupancy_mut(unit.sequence, |occ| {
            occ.unbind(unit.position, unit.position + r.width - 1)
        });
    if let Ok(changes) = changes {
        for (s, d) in changes {
            world.propagate_site_change(s, d, deps, queue);
        }
    }
    if let Some(product) = world.product_tables[r.product_table].lookup(unit.sequence) {
        world.reactants.add_free(product, 1, deps, queue);
    }
    ApplyOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ReactionId;
    use crate::manager::DependencyTable;
    use crate::random::RandomSource;
    use crate::reactant::Reactant;
    use crate::validity::ValidityQueue;
    use crate::world::World;

    fn fresh_world() -> World {
        World::new(1.0, RandomSource::new_with_seed(1))
    }

    #[test]
    fn chemical_reaction_mass_action_rate() {
        let mut world = fresh_world();
        let a = world.reactants.push(Reactant::new_free_chemical("A", 5));
        let b = world.reactants.push(Reactant::new_free_chemical("B", 0));
        let r = Reaction::new_chemical(vec![(a, 2)], vec![(b, 1)], 1.0);
        // falling factorial 5*4 = 20
        assert!((r.rate(&world) - 20.0).abs() < 1e-9);
        let deps = DependencyTable::new(2);
        let mut queue = ValidityQueue::new();
        r.apply(&mut world, &deps, &mut queue);
        assert_eq!(world.reactants.get(a).count(), 3);
        assert_eq!(world.reactants.get(b).count(), 1);
    }

    /// Two `SequenceBinding` reactions sharing one family: firing one must
    /// invalidate the other's stored rate under the dependency/graph
    /// managers, since both read the same `family.total_weight()`.
    #[test]
    fn sibling_sequence_binding_reaction_invalidated_by_shared_family() {
        use crate::ids::SiteId;
        use crate::site::{BindingSite, BindingSiteFamily};

        let mut world = fresh_world();
        let seq = world.reactants.push(Reactant::new_sequence("S", 10));
        let family = FamilyId::from(world.families.len());
        world.families.push(BindingSiteFamily::new());
        let site = SiteId::from(world.sites.len());
        world.sites.push(BindingSite {
            sequence: seq,
            first: 0,
            last: 9,
            width: 3,
            frame: 0,
            affinity: 1.0,
        });
        world.family_mut(family).add_site(site);
        let k0 = world
            .reactants
            .with_sequence_occupancy_mut(seq, |occ| occ.register_site(site, 0, 9, 3));
        world.family_mut(family).notify_k_changed(k0 as i64, 1.0);

        let free_a = world.reactants.push(Reactant::new_free_chemical("FreeA", 5));
        let bound_a = world.reactants.push(Reactant::new_bound_chemical("BoundA"));
        let free_b = world.reactants.push(Reactant::new_free_chemical("FreeB", 5));
        let bound_b = world.reactants.push(Reactant::new_bound_chemical("BoundB"));

        let r_a = Reaction::SequenceBinding(SequenceBindingReaction {
            free: free_a,
            family,
            bound: bound_a,
            width: 3,
            k: 1.0,
        });
        let r_b = Reaction::SequenceBinding(SequenceBindingReaction {
            free: free_b,
            family,
            bound: bound_b,
            width: 3,
            k: 1.0,
        });
        let reactions = [r_a.clone(), r_b.clone()];

        // r_b.reactants() must declare the shared sequence as a dependency,
        // or the table below would never route an invalidation to it.
        assert!(r_b.reactants(&world).contains(&seq));

        let deps = DependencyTable::build_from_reactions(world.reactants.len(), &reactions, &world);
        let mut queue = ValidityQueue::new();

        let rate_b_before = r_b.rate(&world);
        assert!(rate_b_before > 0.0);

        r_a.apply(&mut world, &deps, &mut queue);

        let invalidated = queue.drain_unique();
        assert!(
            invalidated.contains(&ReactionId::from(1)),
            "firing r_a must invalidate r_b, which reads the same family's weight"
        );

        let rate_b_after = r_b.rate(&world);
        assert!(rate_b_after < rate_b_before);
    }
}
