//! Latest tick and contract per instrument.

use std::collections::HashMap;

use crate::types::{Contract, InstrumentKey, Tick};

/// Last-write-wins store of market data. Absence is normal: it just means
/// the instrument has not been seen yet.
#[derive(Debug, Default)]
pub struct MarketState {
    ticks: HashMap<InstrumentKey, Tick>,
    contracts: HashMap<InstrumentKey, Contract>,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_tick(&mut self, tick: Tick) {
        self.ticks.insert(tick.instrument.clone(), tick);
    }

    pub fn update_contract(&mut self, contract: Contract) {
        self.contracts.insert(contract.instrument.clone(), contract);
    }

    pub fn tick(&self, key: &InstrumentKey) -> Option<&Tick> {
        self.ticks.get(key)
    }

    pub fn contract(&self, key: &InstrumentKey) -> Option<&Contract> {
        self.contracts.get(key)
    }
}
