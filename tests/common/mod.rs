//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::broadcast;

use momentum_engine::bus::EventBus;
use momentum_engine::engine::{EngineSettings, StrategyEngine};
use momentum_engine::gateway::paper::PaperGateway;
use momentum_engine::types::*;

pub fn key(s: &str) -> InstrumentKey {
    s.parse().expect("valid instrument key")
}

pub fn contract(s: &str, size: Decimal) -> Event {
    Event::Contract(Contract {
        instrument: key(s),
        size,
    })
}

pub fn position(id: &str, s: &str, direction: Direction, volume: Decimal) -> Event {
    Event::Position(Position {
        position_id: id.to_string(),
        instrument: key(s),
        direction,
        volume,
    })
}

fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap()
}

/// Ticks one second apart, starting `offset_secs` into the session.
pub fn ticks_from(s: &str, offset_secs: i64, prices: &[i64]) -> Vec<Event> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Event::Tick(Tick {
                instrument: key(s),
                last_price: Decimal::from(*p),
                datetime: session_start() + Duration::seconds(offset_secs + i as i64),
            })
        })
        .collect()
}

pub fn ticks(s: &str, prices: &[i64]) -> Vec<Event> {
    ticks_from(s, 0, prices)
}

/// Engine wired to a paper gateway; the returned gateway shares its records.
pub fn paper_engine(trading: &[&str]) -> (StrategyEngine, PaperGateway) {
    let gateway = PaperGateway::new("PAPER");
    let settings = EngineSettings {
        history_capacity: Some(8),
        ..EngineSettings::new(trading.iter().map(|s| key(s)).collect())
    };
    let engine = StrategyEngine::new(Arc::new(gateway.clone()), EventBus::new(256), settings);
    (engine, gateway)
}

pub async fn feed(engine: &mut StrategyEngine, events: Vec<Event>) {
    for event in events {
        engine.handle(event).await;
    }
}

pub fn drain(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

pub fn logs(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Log(log) => Some(log.message.clone()),
            _ => None,
        })
        .collect()
}

pub fn signals(events: &[EngineEvent]) -> Vec<SignalEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Signal(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

pub const SIZE: Decimal = dec!(10);
