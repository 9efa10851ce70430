use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draw::{DrawRecord, Round};

/// The ordered draw history: records keyed by round, unique round per
/// record, sorted ascending. Owned exclusively by the synchronization
/// driver for the duration of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawHistory {
    records: Vec<DrawRecord>,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum HistoryError {
    #[error("round {0} already present in history")]
    DuplicateRound(Round),
}

impl DrawHistory {
    /// Build a history from records in any order. Sorts ascending by round
    /// and rejects duplicate rounds.
    pub fn from_records(mut records: Vec<DrawRecord>) -> Result<Self, HistoryError> {
        records.sort_by_key(DrawRecord::round);

        for pair in records.windows(2) {
            if pair[0].round() == pair[1].round() {
                return Err(HistoryError::DuplicateRound(pair[0].round()));
            }
        }

        Ok(Self { records })
    }

    /// Highest persisted round, or `None` for an empty history.
    pub fn latest_round(&self) -> Option<Round> {
        self.records.last().map(DrawRecord::round)
    }

    pub fn get(&self, round: Round) -> Option<&DrawRecord> {
        self.records
            .binary_search_by_key(&round, DrawRecord::round)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Append new records and re-sort. Monotonic append is the only
    /// mutation the history supports.
    pub fn extend(&mut self, new: Vec<DrawRecord>) -> Result<(), HistoryError> {
        if new.is_empty() {
            return Ok(());
        }

        self.records.extend(new);
        self.records.sort_by_key(DrawRecord::round);

        for pair in self.records.windows(2) {
            if pair[0].round() == pair[1].round() {
                return Err(HistoryError::DuplicateRound(pair[0].round()));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawRecord> {
        self.records.iter()
    }
}
