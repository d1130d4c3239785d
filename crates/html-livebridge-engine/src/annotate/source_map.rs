use std::collections::BTreeMap;

use crate::models::{SourceProvenance, TrackingId};

/// Provenance of every element tracked in one render generation.
///
/// The map is rebuilt from scratch on every refresh and never merged across
/// generations: line numbers and occurrence indices are only meaningful
/// against the exact text that produced them.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    entries: BTreeMap<TrackingId, SourceProvenance>,
    generation: u64,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry and starts a new generation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Number of times the map has been cleared.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records `provenance` under the next sequential id and returns that id.
    pub fn push(&mut self, provenance: SourceProvenance) -> TrackingId {
        let id = TrackingId::new(self.entries.len());
        self.entries.insert(id, provenance);
        id
    }

    pub fn get(&self, id: TrackingId) -> Option<&SourceProvenance> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (TrackingId, &SourceProvenance)> {
        self.entries.iter().map(|(id, p)| (*id, p))
    }

    /// First element recorded on the 1-based `line_number`.
    pub fn find_by_line(&self, line_number: usize) -> Option<(TrackingId, &SourceProvenance)> {
        self.iter().find(|(_, p)| p.line_number() == line_number)
    }
}
