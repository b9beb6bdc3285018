//! Per-instrument tick history.
//!
//! Arrival-ordered ring of past ticks. Only the tail is ever read, so a
//! capacity bounds memory; `None` keeps every tick for the process lifetime.

use std::collections::{HashMap, VecDeque};

use crate::types::{InstrumentKey, Tick};

#[derive(Debug, Default)]
pub struct HistoryBuffer {
    capacity: Option<usize>,
    ticks: HashMap<InstrumentKey, VecDeque<Tick>>,
}

impl HistoryBuffer {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ticks: HashMap::new(),
        }
    }

    pub fn append(&mut self, tick: Tick) {
        let history = self.ticks.entry(tick.instrument.clone()).or_default();
        history.push_back(tick);
        if let Some(cap) = self.capacity {
            while history.len() > cap {
                history.pop_front();
            }
        }
    }

    /// Up to the last `n` ticks for `key`, oldest first.
    pub fn recent(&self, key: &InstrumentKey, n: usize) -> Vec<&Tick> {
        match self.ticks.get(key) {
            Some(history) => {
                let skip = history.len().saturating_sub(n);
                history.iter().skip(skip).collect()
            }
            None => Vec::new(),
        }
    }

    pub fn len(&self, key: &InstrumentKey) -> usize {
        self.ticks.get(key).map_or(0, VecDeque::len)
    }
}
