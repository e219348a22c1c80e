//! Per-cycle set of newly discovered summoner ids
//!
//! A summoner referenced by several matches in the same cycle is only looked up
//! once; ids come out in ascending order, chunked to the API's batch limit.

use std::collections::BTreeSet;

/// Summoner ids awaiting a lookup in the current cycle
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    pending: BTreeSet<i64>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an id; returns false if it was already pending
    pub fn insert(&mut self, summoner_id: i64) -> bool {
        self.pending.insert(summoner_id)
    }

    pub fn contains(&self, summoner_id: i64) -> bool {
        self.pending.contains(&summoner_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Consumes the frontier, splitting it into lookup batches
    ///
    /// # Arguments
    ///
    /// * `size` - Maximum ids per batch; must be at least 1
    pub fn into_chunks(self, size: usize) -> Vec<Vec<i64>> {
        let ids: Vec<i64> = self.pending.into_iter().collect();
        ids.chunks(size.max(1)).map(<[i64]>::to_vec).collect()
    }
}
