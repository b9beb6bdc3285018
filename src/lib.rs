//! Momentum engine: reactive market-event correlator and signal engine.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod bus;
pub mod config;
pub mod engine;
pub mod feed;
pub mod gateway;
pub mod types;
