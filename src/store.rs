//! In-memory carrier record repository
//!
//! The record collection consumed by exports and enrichment is owned by an
//! explicitly injected store with defined read/merge/replace operations,
//! not a bare module-level list. Persistence beyond process lifetime is out
//! of scope.

use crate::carrier::CarrierRecord;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<CarrierRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CarrierRecord] {
        &self.records
    }

    pub fn get(&self, mc_number: &str) -> Option<&CarrierRecord> {
        self.records.iter().find(|r| r.mc_number == mc_number)
    }

    /// Append records whose MC number is not already present, preserving
    /// insertion order. Returns how many were added.
    pub fn merge_new(&mut self, incoming: Vec<CarrierRecord>) -> usize {
        let existing: HashSet<String> =
            self.records.iter().map(|r| r.mc_number.clone()).collect();

        let mut added = 0;
        let mut seen = existing;
        for record in incoming {
            if seen.insert(record.mc_number.clone()) {
                self.records.push(record);
                added += 1;
            }
        }
        added
    }

    /// Replace stored records with updated copies, matched by MC number.
    /// Records without a match are left untouched; updates without a stored
    /// counterpart are ignored.
    pub fn apply_updates(&mut self, updates: &[CarrierRecord]) {
        for update in updates {
            if let Some(slot) = self
                .records
                .iter_mut()
                .find(|r| r.mc_number == update.mc_number)
            {
                *slot = update.clone();
            }
        }
    }
}
