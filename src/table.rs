//! Loading and product tables (spec §4.6): the small lookup structures
//! that Loading and Release reactions consult to decide what a bound unit
//! consumes as it advances, and what it produces when it dissociates.

use std::collections::HashMap;

use crate::ids::ReactantId;

/// Maps a position along a template's reading frame to the free chemical
/// consumed there (e.g. the charged tRNA matching the codon at that
/// position). Keyed by reading-frame position rather than by template
/// content, since the reading frame is what a Loading reaction advances.
#[derive(Clone, Debug, Default)]
pub struct LoadingTable {
    entries: HashMap<u64, ReactantId>,
}

impl LoadingTable {
    pub fn new() -> Self {
        LoadingTable::default()
    }

    pub fn set(&mut self, position: u64, consumed: ReactantId) {
        self.entries.insert(position, consumed);
    }

    pub fn lookup(&self, position: u64) -> Option<ReactantId> {
        self.entries.get(&position).copied()
    }
}

/// Maps a template sequence to the free-chemical product released when a
/// bound unit on it dissociates.
#[derive(Clone, Debug, Default)]
pub struct ProductTable {
    entries: HashMap<ReactantId, ReactantId>,
}

impl ProductTable {
    pub fn new() -> Self {
        ProductTable::default()
    }

    pub fn set(&mut self, template: ReactantId, product: ReactantId) {
        self.entries.insert(template, product);
    }

    pub fn lookup(&self, template: ReactantId) -> Option<ReactantId> {
        self.entries.get(&template).copied()
    }
}
