//! Trading gateway integration.
//!
//! Defines the `TradingGateway` trait: the engine's only way to reach a
//! venue. The transport behind it (order entry, market-data subscription,
//! connection lifecycle) lives outside this crate; `PaperGateway` is an
//! in-memory stand-in used by the binary and the tests.

pub mod paper;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{OrderRequest, SubscribeRequest};

/// Abstraction over a trading venue connection.
///
/// Calls are fire-and-forget from the engine's point of view: an error means
/// the venue refused the request, and the engine reports it without retrying.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradingGateway: Send + Sync {
    /// Open the venue session.
    async fn connect(&self) -> Result<()>;

    /// Request market data for an instrument.
    /// Whether repeated requests are harmless is up to the implementor.
    async fn subscribe(&self, req: SubscribeRequest) -> Result<()>;

    /// Submit an order. Returns the gateway-assigned order id.
    async fn send_order(&self, req: OrderRequest) -> Result<String>;

    /// Close the venue session.
    async fn close(&self) -> Result<()>;

    /// Gateway name for logging and identification.
    fn name(&self) -> &str;
}
