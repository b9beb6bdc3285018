//! Position tracking.
//!
//! Holds the latest broker-reported snapshot per position id, plus an index
//! from instrument to the ids held on it so subscription decisions can ask
//! "do we hold anything here?" without scanning.

use std::collections::{BTreeSet, HashMap};

use crate::types::{InstrumentKey, Position};

#[derive(Debug, Default)]
pub struct PositionTracker {
    by_id: HashMap<String, Position>,
    by_instrument: HashMap<InstrumentKey, BTreeSet<String>>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `position`, replacing any earlier snapshot with the same id.
    pub fn update(&mut self, position: Position) {
        if let Some(previous) = self.by_id.get(&position.position_id) {
            // Same id normally means same instrument; keep the index honest
            // if a venue ever reuses one.
            if previous.instrument != position.instrument {
                if let Some(ids) = self.by_instrument.get_mut(&previous.instrument) {
                    ids.remove(&position.position_id);
                    if ids.is_empty() {
                        self.by_instrument.remove(&previous.instrument);
                    }
                }
            }
        }

        self.by_instrument
            .entry(position.instrument.clone())
            .or_default()
            .insert(position.position_id.clone());
        self.by_id.insert(position.position_id.clone(), position);
    }

    pub fn get(&self, position_id: &str) -> Option<&Position> {
        self.by_id.get(position_id)
    }

    pub fn has_instrument(&self, key: &InstrumentKey) -> bool {
        self.by_instrument.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}
