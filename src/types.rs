//! Shared types for the momentum engine.
//!
//! These types form the data model used across all modules: market data,
//! instrument definitions, positions, gateway requests, and the events that
//! flow in and out of the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Instrument key
// ---------------------------------------------------------------------------

/// Globally unique instrument identifier: a symbol on a given exchange.
///
/// The text form is `"<symbol>.<exchange>"`, e.g. `rb2405.SHFE`. Symbols may
/// themselves contain dots, so parsing splits on the last one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentKey {
    pub symbol: String,
    pub exchange: String,
}

impl InstrumentKey {
    pub fn new(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
        }
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.exchange)
    }
}

impl FromStr for InstrumentKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.rsplit_once('.') {
            Some((symbol, exchange)) if !symbol.is_empty() && !exchange.is_empty() => {
                Ok(Self::new(symbol, exchange))
            }
            _ => Err(EngineError::InvalidInstrument(s.to_string())),
        }
    }
}

impl TryFrom<String> for InstrumentKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InstrumentKey> for String {
    fn from(key: InstrumentKey) -> Self {
        key.to_string()
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Position / order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
}

/// Whether an order opens a new position or closes an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Offset {
    Open,
    Close,
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Open => write!(f, "OPEN"),
            Offset::Close => write!(f, "CLOSE"),
        }
    }
}

/// The engine's intended inventory for an instrument.
///
/// Independent of the broker-reported [`Position`]; it exists so repeated
/// signal evaluations stay idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    #[default]
    Flat,
    Long,
}

impl TargetState {
    /// Target inventory in units (0 or 1).
    pub fn units(self) -> u32 {
        match self {
            TargetState::Flat => 0,
            TargetState::Long => 1,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.units())
    }
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

/// A single market-data update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: InstrumentKey,
    pub last_price: Decimal,
    pub datetime: DateTime<Utc>,
}

/// Tradable instrument definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub instrument: InstrumentKey,
    /// Contract multiplier.
    pub size: Decimal,
}

impl Contract {
    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }

    pub fn exchange(&self) -> &str {
        &self.instrument.exchange
    }
}

/// Broker-reported holding. Unique per instrument + direction + account;
/// a newer snapshot with the same id replaces the older one entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: String,
    pub instrument: InstrumentKey,
    pub direction: Direction,
    pub volume: Decimal,
}

// ---------------------------------------------------------------------------
// Gateway requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub symbol: String,
    pub exchange: String,
}

impl SubscribeRequest {
    pub fn for_contract(contract: &Contract) -> Self {
        Self {
            symbol: contract.symbol().to_string(),
            exchange: contract.exchange().to_string(),
        }
    }

    pub fn instrument(&self) -> InstrumentKey {
        InstrumentKey::new(&self.symbol, &self.exchange)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub exchange: String,
    pub direction: Direction,
    pub order_type: OrderType,
    pub price: Decimal,
    pub volume: Decimal,
    pub offset: Offset,
}

impl OrderRequest {
    pub fn instrument(&self) -> InstrumentKey {
        InstrumentKey::new(&self.symbol, &self.exchange)
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} @ {}",
            self.instrument(),
            self.direction,
            self.offset,
            self.volume,
            self.price,
        )
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything the engine consumes arrives through this enum.
///
/// The JSON form is internally tagged, e.g.
/// `{"type":"tick","instrument":"rb2405.SHFE","last_price":3500,"datetime":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Tick(Tick),
    Contract(Contract),
    Position(Position),
    /// Periodic trigger for the valuation pass.
    Timer,
}

/// Free-text status message produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub message: String,
    pub source: String,
    pub datetime: DateTime<Utc>,
}

/// Telemetry emitted after every signal evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub instrument: InstrumentKey,
    pub datetime: DateTime<Utc>,
    pub last_price: Decimal,
    pub target: TargetState,
}

/// Everything the engine publishes onto the outbound bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineEvent {
    Log(LogEvent),
    Signal(SignalEvent),
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid instrument key: {0:?} (expected \"<symbol>.<exchange>\")")]
    InvalidInstrument(String),

    #[error("Trading setting error ({path}): {message}")]
    Setting { path: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error ({gateway}): {message}")]
    Gateway { gateway: String, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
