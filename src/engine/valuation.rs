//! Mark-to-market valuation of held positions.
//!
//! Best-effort: a position whose instrument has no tick or no contract yet is
//! skipped, as is one whose value does not fit in a `Decimal`. Never mutates
//! state.

use rust_decimal::Decimal;
use std::fmt;
use tracing::{debug, warn};

use super::market::MarketState;
use super::positions::PositionTracker;
use crate::types::{Direction, InstrumentKey};

/// Market value of a single position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionValuation {
    pub position_id: String,
    pub instrument: InstrumentKey,
    pub direction: Direction,
    pub volume: Decimal,
    pub last_price: Decimal,
    pub size: Decimal,
    /// `volume × last_price × size`
    pub value: Decimal,
}

impl fmt::Display for PositionValuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} position market value {}",
            self.instrument, self.direction, self.value
        )
    }
}

pub struct ValuationReporter;

impl ValuationReporter {
    /// Value every position that has both a tick and a contract, ordered by
    /// position id.
    pub fn value_positions(
        market: &MarketState,
        positions: &PositionTracker,
    ) -> Vec<PositionValuation> {
        let mut out: Vec<PositionValuation> = positions
            .iter()
            .filter_map(|position| {
                let key = &position.instrument;
                let (Some(tick), Some(contract)) = (market.tick(key), market.contract(key)) else {
                    debug!(
                        position_id = %position.position_id,
                        instrument = %key,
                        "Missing tick or contract, skipping valuation"
                    );
                    return None;
                };

                let Some(value) = position
                    .volume
                    .checked_mul(tick.last_price)
                    .and_then(|v| v.checked_mul(contract.size))
                else {
                    warn!(
                        position_id = %position.position_id,
                        instrument = %key,
                        volume = %position.volume,
                        last_price = %tick.last_price,
                        size = %contract.size,
                        "Market value out of range, skipping valuation"
                    );
                    return None;
                };

                Some(PositionValuation {
                    position_id: position.position_id.clone(),
                    instrument: key.clone(),
                    direction: position.direction,
                    volume: position.volume,
                    last_price: tick.last_price,
                    size: contract.size,
                    value,
                })
            })
            .collect();

        out.sort_by(|a, b| a.position_id.cmp(&b.position_id));
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
