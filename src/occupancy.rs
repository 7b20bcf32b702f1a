//! Sequence occupancy (spec §4.5) — the hardest data structure in the
//! kernel. Tracks, per position of a chemical sequence, how many binders
//! currently occupy it, and exposes, for each registered binding site,
//! the number of free start offsets within its footprint.
//!
//! Positions not yet synthesized (for a sequence under polymerization) are
//! represented with the sentinel height [`UNSYNTH`], which folds "not yet
//! built" into the same contiguous-segment machinery as ordinary
//! occupancy: an unsynthesized position is never free, so it is excluded
//! from every site's k(s) for free, with no separate bookkeeping.

use std::collections::HashMap;

use crate::error::{Result, SimError};
use crate::ids::SiteId;

/// Sentinel height marking a position as not yet synthesized.
const UNSYNTH: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    first: u64,
    /// Exclusive.
    last: u64,
    height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialStrandState {
    Empty,
    Growing,
    Complete,
}

#[derive(Clone, Debug)]
struct SiteSpec {
    first: u64,
    last: u64,
    width: u64,
    k: u64,
}

#[derive(Clone, Debug)]
pub struct SequenceOccupancy {
    length: u64,
    segments: Vec<Segment>,
    sites: HashMap<SiteId, SiteSpec>,
}

impl SequenceOccupancy {
    /// A fully-synthesized sequence (the common case: not a growing polymer).
    pub fn new(length: u64) -> Self {
        SequenceOccupancy {
            length,
            segments: vec![Segment {
                first: 0,
                last: length,
                height: 0,
            }],
            sites: HashMap::new(),
        }
    }

    /// A sequence under progressive construction: entirely unsynthesized.
    pub fn new_growing(length: u64) -> Self {
        SequenceOccupancy {
            length,
            segments: vec![Segment {
                first: 0,
                last: length,
                height: UNSYNTH,
            }],
            sites: HashMap::new(),
        }
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn partial_strand_state(&self) -> PartialStrandState {
        let any_synth = self.segments.iter().any(|s| s.height != UNSYNTH);
        let all_synth = self.segments.iter().all(|s| s.height != UNSYNTH);
        if all_synth {
            PartialStrandState::Complete
        } else if any_synth {
            PartialStrandState::Growing
        } else {
            PartialStrandState::Empty
        }
    }

    /// Registers a binding site `s = [first, last]` of the given `width`,
    /// computing its initial k(s).
    pub fn register_site(&mut self, id: SiteId, first: u64, last: u64, width: u64) -> u64 {
        let k = self.compute_k(first, last, width);
        self.sites.insert(
            id,
            SiteSpec {
                first,
                last,
                width,
                k,
            },
        );
        k
    }

    pub fn free_count(&self, id: SiteId) -> u64 {
        self.sites.get(&id).map(|s| s.k).unwrap_or(0)
    }

    /// True if every position in `[a, b]` is synthesized and unoccupied.
    pub fn is_free(&self, a: u64, b: u64) -> bool {
        if !self.in_bounds(a, b) {
            return false;
        }
        self.segments
            .iter()
            .filter(|s| s.first < b + 1 && a < s.last)
            .all(|s| s.height == 0)
    }

    /// Enumerates every free start offset for a registered site, in
    /// ascending order. Used by sequence-binding reactions to pick a
    /// uniform free offset within the chosen site (spec §4.6).
    pub fn free_offsets(&self, id: SiteId) -> Vec<u64> {
        let Some(spec) = self.sites.get(&id) else {
            return Vec::new();
        };
        let (first, last, width) = (spec.first, spec.last, spec.width);
        let mut offsets = Vec::new();
        for seg in self
            .segments
            .iter()
            .filter(|s| s.height == 0 && s.first < last + 1 && first < s.last)
        {
            let lo = seg.first.max(first);
            let hi = seg.last.min(last + 1);
            if hi > lo && hi - lo >= width {
                offsets.extend(lo..=(hi - width));
            }
        }
        offsets
    }

    /// Splits the segment containing `p` so that `p` lies on a segment
    /// boundary, unless `p` is already one (or `p >= length`, the
    /// exclusive one-past-the-end case used by callers).
    fn split_at(&mut self, p: u64) {
        if p >= self.length {
            return;
        }
        if let Some(idx) = self.segments.iter().position(|s| s.first < p && p < s.last) {
            let seg = self.segments[idx];
            self.segments[idx].last = p;
            self.segments.insert(
                idx + 1,
                Segment {
                    first: p,
                    last: seg.last,
                    height: seg.height,
                },
            );
        }
    }

    fn coalesce(&mut self) {
        let mut i = 0;
        while i + 1 < self.segments.len() {
            if self.segments[i].height == self.segments[i + 1].height {
                self.segments[i].last = self.segments[i + 1].last;
                self.segments.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    fn in_bounds(&self, a: u64, b: u64) -> bool {
        a <= b && b < self.length
    }

    fn all_synthesized(&self, a: u64, b: u64) -> bool {
        self.segments
            .iter()
            .filter(|s| s.first < b + 1 && a < s.last)
            .all(|s| s.height != UNSYNTH)
    }

    /// Occupies `[a, b]` (inclusive), incrementing the height of every
    /// position in that interval by one. Returns the set of registered
    /// sites whose k(s) changed, each listed once with the signed delta.
    pub fn bind(&mut self, a: u64, b: u64) -> Result<Vec<(SiteId, i64)>> {
        if !self.in_bounds(a, b) || !self.all_synthesized(a, b) {
            return Err(SimError::OutOfStrand);
        }
        self.split_at(a);
        self.split_at(b + 1);
        for seg in self
            .segments
            .iter_mut()
            .filter(|s| s.first >= a && s.last <= b + 1)
        {
            seg.height += 1;
        }
        self.coalesce();
        Ok(self.refresh_sites_overlapping(a, b))
    }

    /// Releases `[a, b]` (inclusive), decrementing the height of every
    /// position in that interval by one.
    pub fn unbind(&mut self, a: u64, b: u64) -> Result<Vec<(SiteId, i64)>> {
        if !self.in_bounds(a, b) || !self.all_synthesized(a, b) {
            return Err(SimError::OutOfStrand);
        }
        self.split_at(a);
        self.split_at(b + 1);
        for seg in self
            .segments
            .iter_mut()
            .filter(|s| s.first >= a && s.last <= b + 1)
        {
            debug_assert!(seg.height > 0, "unbind below zero occupancy");
            seg.height -= 1;
        }
        self.coalesce();
        Ok(self.refresh_sites_overlapping(a, b))
    }

    /// Marks `[a, b]` as newly synthesized (polymerization progress),
    /// transitioning those positions from [`UNSYNTH`] to free (height 0).
    pub fn synthesize(&mut self, a: u64, b: u64) -> Vec<(SiteId, i64)> {
        assert!(self.in_bounds(a, b), "synthesize interval out of bounds");
        self.split_at(a);
        self.split_at(b + 1);
        for seg in self
            .segments
            .iter_mut()
            .filter(|s| s.first >= a && s.last <= b + 1)
        {
            debug_assert_eq!(seg.height, UNSYNTH, "region already synthesized");
            seg.height = 0;
        }
        self.coalesce();
        self.refresh_sites_overlapping(a, b)
    }

    fn compute_k(&self, first: u64, last: u64, width: u64) -> u64 {
        let mut k = 0u64;
        for seg in self
            .segments
            .iter()
            .filter(|s| s.height == 0 && s.first < last + 1 && first < s.last)
        {
            let lo = seg.first.max(first);
            let hi = seg.last.min(last + 1);
            if hi > lo {
                let run = hi - lo;
                if run >= width {
                    k += run - width + 1;
                }
            }
        }
        k
    }

    fn refresh_sites_overlapping(&mut self, a: u64, b: u64) -> Vec<(SiteId, i64)> {
        let mut changes = Vec::new();
        let ids: Vec<SiteId> = self
            .sites
            .iter()
            .filter(|(_, s)| s.first <= b && a <= s.last)
            .map(|(&id, _)| id)
            .collect();
        for id in ids {
            let (first, last, width, old_k) = {
                let s = &self.sites[&id];
                (s.first, s.last, s.width, s.k)
            };
            let new_k = self.compute_k(first, last, width);
            if new_k != old_k {
                self.sites.get_mut(&id).unwrap().k = new_k;
                changes.push((id, new_k as i64 - old_k as i64));
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_single_site_binding() {
        // spec §8 scenario 3: site of width 3 on a sequence of length 10.
        let mut occ = SequenceOccupancy::new(10);
        let site = SiteId(0);
        let k0 = occ.register_site(site, 0, 9, 3);
        assert_eq!(k0, 8); // offsets 0..=7

        // One binder occupies the leftmost footprint (offset 0, positions
        // 0..=2): only the 3 offsets whose window overlaps it are
        // disabled, the edge effect the spec's own numbers assume.
        let changes = occ.bind(0, 2).unwrap();
        assert_eq!(changes, vec![(site, -3)]);
        assert_eq!(occ.free_count(site), 5);
    }

    #[test]
    fn balanced_bind_unbind_restores_k() {
        let mut occ = SequenceOccupancy::new(20);
        let site = SiteId(0);
        let k0 = occ.register_site(site, 0, 19, 4);
        occ.bind(5, 9).unwrap();
        occ.bind(0, 2).unwrap();
        occ.unbind(0, 2).unwrap();
        occ.unbind(5, 9).unwrap();
        assert_eq!(occ.free_count(site), k0);
        assert_eq!(occ.segments.len(), 1);
        assert_eq!(occ.segments[0].height, 0);
    }

    #[test]
    fn out_of_strand_before_synthesis() {
        let mut occ = SequenceOccupancy::new_growing(10);
        assert_eq!(occ.bind(0, 2), Err(SimError::OutOfStrand));
        occ.synthesize(0, 4);
        assert!(occ.bind(0, 2).is_ok());
        assert_eq!(occ.bind(3, 6), Err(SimError::OutOfStrand));
    }

    #[test]
    fn partial_strand_state_machine() {
        let mut occ = SequenceOccupancy::new_growing(10);
        assert_eq!(occ.partial_strand_state(), PartialStrandState::Empty);
        occ.synthesize(0, 4);
        assert_eq!(occ.partial_strand_state(), PartialStrandState::Growing);
        occ.synthesize(5, 9);
        assert_eq!(occ.partial_strand_state(), PartialStrandState::Complete);
    }

    #[test]
    fn overlapping_binders_reduce_free_offsets_correctly() {
        let mut occ = SequenceOccupancy::new(10);
        let site = SiteId(0);
        occ.register_site(site, 0, 9, 1);
        assert_eq!(occ.free_count(site), 10);
        occ.bind(3, 3).unwrap();
        assert_eq!(occ.free_count(site), 9);
        // A second binder stacking on the same position is legal (height
        // has no upper bound) and keeps that offset unavailable.
        occ.bind(3, 3).unwrap();
        assert_eq!(occ.free_count(site), 9);
        occ.unbind(3, 3).unwrap();
        assert_eq!(occ.free_count(site), 9);
        occ.unbind(3, 3).unwrap();
        assert_eq!(occ.free_count(site), 10);
    }
}
