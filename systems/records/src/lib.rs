#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-runs leaderboard fed by finished runs.
//!
//! Records are ranked by play time, longest first. Two records with the same
//! reached date and the same play time to two decimals count as one run.

use std::collections::HashSet;

use panel_cut_core::RunRecord;
use serde::{Deserialize, Serialize};

/// Number of records kept by [`Leaderboard::default`].
pub const DEFAULT_CAPACITY: usize = 5;

/// Bounded, sorted list of the longest runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    capacity: usize,
    records: Vec<RunRecord>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Leaderboard {
    /// Creates an empty board keeping at most `capacity` records.
    ///
    /// The board always holds at least one record.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of records kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records ordered by play time, longest first.
    #[must_use]
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Longest run on the board.
    #[must_use]
    pub fn best(&self) -> Option<&RunRecord> {
        self.records.first()
    }

    /// Records of runs that reached the end date.
    pub fn cleared_records(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|record| record.cleared)
    }

    /// Position a run of `elapsed_seconds` would take, if it makes the board.
    ///
    /// Ties rank behind records already on the board.
    #[must_use]
    pub fn rank_for(&self, elapsed_seconds: f32) -> Option<usize> {
        let position = self
            .records
            .iter()
            .take_while(|record| record.elapsed_seconds >= elapsed_seconds)
            .count();
        (position < self.capacity).then_some(position)
    }

    /// Adds a finished run, returning the position it took.
    ///
    /// Returns `None` when the run duplicates a record on the board or is too
    /// short to rank.
    pub fn submit(&mut self, record: RunRecord) -> Option<usize> {
        let key = dedup_key(&record);
        if self.records.iter().any(|existing| dedup_key(existing) == key) {
            return None;
        }

        let position = self.rank_for(record.elapsed_seconds)?;
        self.records.insert(position, record);
        self.records.truncate(self.capacity);
        Some(position)
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Encodes the board as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Decodes a board, restoring order, uniqueness and the capacity bound.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut decoded: Self = serde_json::from_str(json)?;
        decoded.normalize();
        Ok(decoded)
    }

    fn normalize(&mut self) {
        self.capacity = self.capacity.max(1);
        let mut seen = HashSet::new();
        self.records.retain(|record| seen.insert(dedup_key(record)));
        self.records
            .sort_by(|a, b| b.elapsed_seconds.total_cmp(&a.elapsed_seconds));
        self.records.truncate(self.capacity);
    }
}

fn dedup_key(record: &RunRecord) -> String {
    format!("{}_{:.2}", record.date_reached, record.elapsed_seconds)
}
