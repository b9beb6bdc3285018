//! Core engine: the event → state → decision loop.
//!
//! `StrategyEngine` owns all per-instrument state and consumes inbound
//! events one at a time from a single channel, so every handler runs to
//! completion before the next event is looked at and no locking is needed.

pub mod history;
pub mod market;
pub mod positions;
pub mod signal;
pub mod subscription;
pub mod valuation;

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::config::AppConfig;
use crate::gateway::TradingGateway;
use crate::types::{
    Contract, Event, InstrumentKey, OrderRequest, Position, SubscribeRequest, TargetState, Tick,
};
use history::HistoryBuffer;
use market::MarketState;
use positions::PositionTracker;
use signal::{SignalEngine, LOOKBACK};
use subscription::SubscriptionManager;
use valuation::{PositionValuation, ValuationReporter};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything the engine needs to know at construction.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub trading_symbols: HashSet<InstrumentKey>,
    pub price_offset: Decimal,
    /// History ring size per instrument; `None` keeps every tick.
    pub history_capacity: Option<usize>,
    /// Run the valuation pass on this period, in addition to `Timer` events.
    pub valuation_interval: Option<Duration>,
}

impl EngineSettings {
    pub fn new(trading_symbols: HashSet<InstrumentKey>) -> Self {
        Self {
            trading_symbols,
            price_offset: signal::DEFAULT_PRICE_OFFSET,
            history_capacity: None,
            valuation_interval: None,
        }
    }

    pub fn from_config(cfg: &AppConfig, trading_symbols: HashSet<InstrumentKey>) -> Self {
        Self {
            trading_symbols,
            price_offset: cfg.engine.price_offset,
            history_capacity: cfg.history_capacity(),
            valuation_interval: cfg
                .valuation
                .enabled
                .then(|| Duration::from_secs(cfg.valuation.interval_secs)),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// All per-instrument state, grouped so one engine instance owns it outright.
#[derive(Debug)]
pub struct EngineState {
    pub market: MarketState,
    pub positions: PositionTracker,
    pub history: HistoryBuffer,
    pub subscriptions: SubscriptionManager,
    pub signals: SignalEngine,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct StrategyEngine {
    gateway: Arc<dyn TradingGateway>,
    bus: EventBus,
    state: EngineState,
    valuation_interval: Option<Duration>,
}

impl StrategyEngine {
    pub fn new(gateway: Arc<dyn TradingGateway>, bus: EventBus, settings: EngineSettings) -> Self {
        Self {
            gateway,
            bus,
            state: EngineState {
                market: MarketState::new(),
                positions: PositionTracker::new(),
                history: HistoryBuffer::new(settings.history_capacity),
                subscriptions: SubscriptionManager::new(settings.trading_symbols),
                signals: SignalEngine::new(settings.price_offset),
            },
            valuation_interval: settings.valuation_interval,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn target(&self, key: &InstrumentKey) -> TargetState {
        self.state.signals.target(key)
    }

    /// Consume events until the sender side closes. Returns the number of
    /// events handled.
    pub async fn run(&mut self, mut events: mpsc::Receiver<Event>) -> u64 {
        let mut timer = self.valuation_interval.map(|every| {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        info!(
            trading_symbols = self.state.subscriptions.trading_symbols().len(),
            valuation_interval = ?self.valuation_interval,
            "Engine loop started"
        );

        let mut handled = 0u64;
        loop {
            tokio::select! {
                maybe_event = events.recv() => match maybe_event {
                    Some(event) => {
                        self.handle(event).await;
                        handled += 1;
                    }
                    None => break,
                },
                _ = next_tick(&mut timer) => {
                    self.report_valuation();
                }
            }
        }

        info!(
            handled,
            positions = self.state.positions.len(),
            "Engine loop finished, ingress closed"
        );
        handled
    }

    /// Dispatch one inbound event.
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Tick(tick) => self.on_tick(tick).await,
            Event::Contract(contract) => self.on_contract(contract).await,
            Event::Position(position) => self.on_position(position).await,
            Event::Timer => {
                self.report_valuation();
            }
        }
    }

    async fn on_tick(&mut self, tick: Tick) {
        let key = tick.instrument.clone();
        self.state.market.update_tick(tick.clone());

        if !self.state.subscriptions.is_trading(&key) {
            return;
        }

        self.state.history.append(tick);
        self.run_trading(&key).await;
    }

    async fn on_contract(&mut self, contract: Contract) {
        self.state.market.update_contract(contract.clone());

        let state = &mut self.state;
        if let Some(req) = state.subscriptions.on_contract(&contract, &state.positions) {
            self.subscribe(req).await;
        }
    }

    async fn on_position(&mut self, position: Position) {
        self.state.positions.update(position.clone());

        let state = &mut self.state;
        if let Some(req) = state.subscriptions.on_position(&position, &state.market) {
            self.subscribe(req).await;
        }
    }

    async fn run_trading(&mut self, key: &InstrumentKey) {
        let evaluation = {
            let state = &mut self.state;
            let recent = state.history.recent(key, LOOKBACK);
            let contract = state.market.contract(key);
            state.signals.evaluate(key, &recent, contract)
        };
        let Some(evaluation) = evaluation else {
            return;
        };

        if let Some(order) = evaluation.order {
            self.send_order(order).await;
        }
        if let Some(message) = evaluation.log {
            // The bus printer shows the line itself.
            debug!(instrument = %key, target = %evaluation.signal.target, "{message}");
            self.bus.log(message);
        }

        debug!(
            instrument = %key,
            history = self.state.history.len(key),
            datetime = %evaluation.signal.datetime,
            last_price = %evaluation.signal.last_price,
            target = %evaluation.signal.target,
            "Signal evaluated"
        );
        self.bus.signal(evaluation.signal);
    }

    async fn subscribe(&self, req: SubscribeRequest) {
        let key = req.instrument();
        match self.gateway.subscribe(req).await {
            Ok(()) => info!(instrument = %key, "Market data subscribed"),
            Err(e) => {
                warn!(instrument = %key, error = %e, "Subscribe failed");
                self.bus.log(format!("{key} subscribe failed: {e}"));
            }
        }
    }

    /// Submit without retry. The target has already moved; a refusal is only
    /// reported.
    async fn send_order(&self, order: OrderRequest) {
        let summary = order.to_string();
        match self.gateway.send_order(order).await {
            Ok(order_id) => info!(order_id = %order_id, order = %summary, "Order sent"),
            Err(e) => {
                warn!(order = %summary, error = %e, "Order rejected by gateway");
                self.bus.log(format!("{summary} send failed: {e}"));
            }
        }
    }

    /// Value all positions that can be valued and report each one.
    pub fn report_valuation(&self) -> Vec<PositionValuation> {
        let values = ValuationReporter::value_positions(&self.state.market, &self.state.positions);
        for v in &values {
            debug!(
                position_id = %v.position_id,
                instrument = %v.instrument,
                direction = %v.direction,
                value = %v.value,
                "Position valued"
            );
            self.bus.log(v.to_string());
        }
        values
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
