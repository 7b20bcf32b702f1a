//! Event schedule (spec §4.10): time-ordered user-scripted perturbations
//! that fire between stochastic reactions, directly setting a reactant's
//! count.

use std::collections::BinaryHeap;
use std::cmp::Ordering;

use crate::ids::ReactantId;
use crate::manager::DependencyTable;
use crate::reactant::ReactantArena;
use crate::validity::ValidityQueue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Add,
    Remove,
    Set,
}

#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub target: ReactantId,
    pub value: i64,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}
impl Eq for Event {}
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that a `BinaryHeap` (max-heap) pops the earliest time.
        other.time.partial_cmp(&self.time).unwrap_or(Ordering::Equal)
    }
}

/// Ordered queue of scripted events, firing in non-decreasing time order.
#[derive(Clone, Debug, Default)]
pub struct EventSchedule {
    heap: BinaryHeap<Event>,
}

impl EventSchedule {
    pub fn new() -> Self {
        EventSchedule::default()
    }

    pub fn push(&mut self, event: Event) {
        self.heap.push(event);
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.time)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pops and applies every event with `time <= t`, in time order,
    /// invalidating the reactions that depend on each event's target.
    pub fn fire_up_to(
        &mut self,
        t: f64,
        reactants: &mut ReactantArena,
        deps: &DependencyTable,
        queue: &mut ValidityQueue,
    ) {
        while let Some(event) = self.heap.peek() {
            if event.time > t {
                break;
            }
            let event = self.heap.pop().unwrap();
            match event.kind {
                EventKind::Add => reactants.add_free(event.target, event.value, deps, queue),
                EventKind::Remove => reactants.add_free(event.target, -event.value, deps, queue),
                EventKind::Set => {
                    reactants.set_free(event.target, event.value, true, deps, queue)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactant::Reactant;

    #[test]
    fn fires_in_nondecreasing_time_order() {
        let mut schedule = EventSchedule::new();
        let mut reactants = ReactantArena::new();
        let a = reactants.push(Reactant::new_free_chemical("A", 0));
        let deps = DependencyTable::new(1);
        let mut queue = ValidityQueue::new();
        schedule.push(Event {
            time: 5.0,
            kind: EventKind::Add,
            target: a,
            value: 1,
        });
        schedule.push(Event {
            time: 1.0,
            kind: EventKind::Add,
            target: a,
            value: 10,
        });
        schedule.push(Event {
            time: 3.0,
            kind: EventKind::Set,
            target: a,
            value: 0,
        });
        schedule.fire_up_to(4.0, &mut reactants, &deps, &mut queue);
        // order: +10 -> 10, set 0 -> 0; the t=5 event is not yet due.
        assert_eq!(reactants.get(a).count(), 0);
        assert!(schedule.peek_time() == Some(5.0));
    }
}
