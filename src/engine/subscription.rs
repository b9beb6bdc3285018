//! Market-data subscription decisions.
//!
//! Two paths lead to a subscription:
//! - the instrument is in the configured trading set, and its contract
//!   arrives;
//! - a position is held on the instrument and its contract is known.
//!
//! Contract and position events arrive in any order, so a position seen
//! before its contract is deferred until the contract event. The position
//! path never subscribes twice for the same instrument.
//!
//! The manager only decides; the engine performs the gateway call.

use std::collections::HashSet;
use tracing::debug;

use super::market::MarketState;
use super::positions::PositionTracker;
use crate::types::{Contract, InstrumentKey, Position, SubscribeRequest};

#[derive(Debug, Default)]
pub struct SubscriptionManager {
    trading_symbols: HashSet<InstrumentKey>,
    /// Instruments subscribed through the position path. Add-only.
    subscribed: HashSet<InstrumentKey>,
}

impl SubscriptionManager {
    pub fn new(trading_symbols: HashSet<InstrumentKey>) -> Self {
        Self {
            trading_symbols,
            subscribed: HashSet::new(),
        }
    }

    pub fn is_trading(&self, key: &InstrumentKey) -> bool {
        self.trading_symbols.contains(key)
    }

    pub fn is_subscribed(&self, key: &InstrumentKey) -> bool {
        self.subscribed.contains(key)
    }

    pub fn trading_symbols(&self) -> &HashSet<InstrumentKey> {
        &self.trading_symbols
    }

    /// Decide whether a newly seen contract needs a subscription.
    ///
    /// Trading-set instruments are requested on every contract event and are
    /// not recorded; the gateway is responsible for tolerating repeats.
    /// Otherwise a position that was waiting for this contract is served now.
    pub fn on_contract(
        &mut self,
        contract: &Contract,
        positions: &PositionTracker,
    ) -> Option<SubscribeRequest> {
        let key = &contract.instrument;

        if self.is_trading(key) {
            return Some(SubscribeRequest::for_contract(contract));
        }

        if positions.has_instrument(key) && !self.is_subscribed(key) {
            debug!(instrument = %key, "Contract arrived for held position");
            self.subscribed.insert(key.clone());
            return Some(SubscribeRequest::for_contract(contract));
        }

        None
    }

    /// Decide whether a position update needs a subscription.
    pub fn on_position(
        &mut self,
        position: &Position,
        market: &MarketState,
    ) -> Option<SubscribeRequest> {
        let key = &position.instrument;

        if self.is_subscribed(key) {
            return None;
        }

        let Some(contract) = market.contract(key) else {
            debug!(instrument = %key, "Position before contract, deferring subscription");
            return None;
        };

        self.subscribed.insert(key.clone());
        Some(SubscribeRequest::for_contract(contract))
    }
}
