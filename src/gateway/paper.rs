//! Paper gateway.
//!
//! Deterministic, in-memory `TradingGateway`: records every subscription and
//! order it accepts, and can be told to refuse requests so downstream-failure
//! handling can be exercised.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::TradingGateway;
use crate::types::{EngineError, OrderRequest, SubscribeRequest};

/// An order accepted by the paper gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub order_id: String,
    pub request: OrderRequest,
}

/// In-memory gateway. Clones share the same recorded state.
#[derive(Debug, Clone)]
pub struct PaperGateway {
    name: String,
    connected: Arc<Mutex<bool>>,
    subscriptions: Arc<Mutex<Vec<SubscribeRequest>>>,
    orders: Arc<Mutex<Vec<PaperOrder>>>,
    /// If set, subscribe and send_order return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl PaperGateway {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            connected: Arc::new(Mutex::new(false)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            orders: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Refuse all subsequent requests with `msg`.
    pub fn set_error(&self, msg: &str) {
        *lock(&self.force_error) = Some(msg.to_string());
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        *lock(&self.connected)
    }

    /// Every subscribe request accepted so far, in call order.
    pub fn subscriptions(&self) -> Vec<SubscribeRequest> {
        lock(&self.subscriptions).clone()
    }

    /// Every order accepted so far, in call order.
    pub fn orders(&self) -> Vec<PaperOrder> {
        lock(&self.orders).clone()
    }

    fn check_error(&self) -> Result<()> {
        match lock(&self.force_error).as_ref() {
            Some(msg) => Err(EngineError::Gateway {
                gateway: self.name.clone(),
                message: msg.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

// A poisoned lock only means another test thread panicked mid-push; the
// recorded data is still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl TradingGateway for PaperGateway {
    async fn connect(&self) -> Result<()> {
        *lock(&self.connected) = true;
        info!(gateway = %self.name, "Paper gateway connected");
        Ok(())
    }

    async fn subscribe(&self, req: SubscribeRequest) -> Result<()> {
        self.check_error()?;
        debug!(gateway = %self.name, symbol = %req.symbol, exchange = %req.exchange, "Subscribe");
        lock(&self.subscriptions).push(req);
        Ok(())
    }

    async fn send_order(&self, req: OrderRequest) -> Result<String> {
        self.check_error()?;
        let order_id = format!("paper-{}", uuid::Uuid::new_v4());
        info!(gateway = %self.name, order_id = %order_id, order = %req, "Paper order accepted");
        lock(&self.orders).push(PaperOrder {
            order_id: order_id.clone(),
            request: req,
        });
        Ok(order_id)
    }

    async fn close(&self) -> Result<()> {
        *lock(&self.connected) = false;
        info!(gateway = %self.name, "Paper gateway closed");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
