//! Momentum signal engine.
//!
//! Looks at the three most recent ticks of a trading instrument:
//! - strictly rising while flat  → buy one lot to open, target becomes long;
//! - strictly falling while long → sell one lot to close, target becomes flat.
//!
//! The per-instrument target is the only gate against duplicate orders.
//! Every evaluation with enough history yields a `SignalEvent`, whether or
//! not a transition fired.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::warn;

use crate::types::{
    Contract, Direction, InstrumentKey, Offset, OrderRequest, OrderType, SignalEvent,
    TargetState, Tick,
};

/// Ticks needed before the rule is evaluated.
pub const LOOKBACK: usize = 3;

/// Default limit-price offset in price units.
pub const DEFAULT_PRICE_OFFSET: Decimal = dec!(10);

/// Lots per order.
const ORDER_VOLUME: Decimal = dec!(1);

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Order to submit, if a transition fired.
    pub order: Option<OrderRequest>,
    /// Human-readable note of the transition, if one fired.
    pub log: Option<String>,
    pub signal: SignalEvent,
}

#[derive(Debug)]
pub struct SignalEngine {
    price_offset: Decimal,
    targets: HashMap<InstrumentKey, TargetState>,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_OFFSET)
    }
}

impl SignalEngine {
    pub fn new(price_offset: Decimal) -> Self {
        Self {
            price_offset,
            targets: HashMap::new(),
        }
    }

    pub fn target(&self, key: &InstrumentKey) -> TargetState {
        self.targets.get(key).copied().unwrap_or_default()
    }

    /// Evaluate the rule for `key`.
    ///
    /// `recent` is the instrument's tick tail, oldest first. Returns `None`
    /// when fewer than [`LOOKBACK`] ticks are available. Without a contract
    /// no order can be built, so transitions are skipped but the signal is
    /// still produced.
    pub fn evaluate(
        &mut self,
        key: &InstrumentKey,
        recent: &[&Tick],
        contract: Option<&Contract>,
    ) -> Option<Evaluation> {
        if recent.len() < LOOKBACK {
            return None;
        }
        let tail = &recent[recent.len() - LOOKBACK..];
        let (t3, t2, t1) = (tail[0], tail[1], tail[2]);

        let rising = t1.last_price > t2.last_price && t2.last_price > t3.last_price;
        let falling = t1.last_price < t2.last_price && t2.last_price < t3.last_price;

        let current = self.target(key);
        let mut order = None;
        let mut log = None;

        if rising && current == TargetState::Flat {
            let price = t1.last_price.checked_add(self.price_offset);
            match (contract, price) {
                (Some(contract), Some(price)) => {
                    order = Some(self.order(contract, Direction::Long, price, Offset::Open));
                    self.targets.insert(key.clone(), TargetState::Long);
                    log = Some(format!("{key} buy open 1 lot {}", t1.datetime));
                }
                (None, _) => warn!(instrument = %key, "Rising momentum but no contract, skipping entry"),
                (_, None) => warn!(
                    instrument = %key,
                    last_price = %t1.last_price,
                    "Entry price out of range, skipping entry"
                ),
            }
        }

        if falling && current == TargetState::Long {
            let price = t1.last_price.checked_sub(self.price_offset);
            match (contract, price) {
                (Some(contract), Some(price)) => {
                    order = Some(self.order(contract, Direction::Short, price, Offset::Close));
                    self.targets.insert(key.clone(), TargetState::Flat);
                    log = Some(format!("{key} sell close 1 lot {}", t1.datetime));
                }
                (None, _) => warn!(instrument = %key, "Falling momentum but no contract, skipping exit"),
                (_, None) => warn!(
                    instrument = %key,
                    last_price = %t1.last_price,
                    "Exit price out of range, skipping exit"
                ),
            }
        }

        Some(Evaluation {
            order,
            log,
            signal: SignalEvent {
                instrument: key.clone(),
                datetime: t1.datetime,
                last_price: t1.last_price,
                target: self.target(key),
            },
        })
    }

    fn order(
        &self,
        contract: &Contract,
        direction: Direction,
        price: Decimal,
        offset: Offset,
    ) -> OrderRequest {
        OrderRequest {
            symbol: contract.symbol().to_string(),
            exchange: contract.exchange().to_string(),
            direction,
            order_type: OrderType::Limit,
            price,
            volume: ORDER_VOLUME,
            offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
