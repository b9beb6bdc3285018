//! Outbound event bus.
//!
//! Thin wrapper around a `tokio::sync::broadcast` channel carrying the
//! engine's `Log` and `Signal` events to any number of listeners (console
//! printer, UI, recorders). Inbound market events do not use this bus: they
//! arrive on a single `mpsc` channel consumed by the engine's dispatch loop.

use chrono::Utc;
use tokio::sync::broadcast;

use crate::types::{EngineEvent, LogEvent, SignalEvent};

/// Source tag stamped on engine log events.
pub const LOG_SOURCE: &str = "STRATEGY";

/// Default number of buffered outbound events per listener.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// A listener that falls more than `capacity` events behind skips the
    /// oldest ones and is told how many it lost.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current listeners.
    pub fn publish(&self, event: EngineEvent) {
        // No listeners is fine (e.g. headless runs).
        let _ = self.sender.send(event);
    }

    pub fn log(&self, message: impl Into<String>) {
        self.publish(EngineEvent::Log(LogEvent {
            message: message.into(),
            source: LOG_SOURCE.to_string(),
            datetime: Utc::now(),
        }));
    }

    pub fn signal(&self, signal: SignalEvent) {
        self.publish(EngineEvent::Signal(signal));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}
