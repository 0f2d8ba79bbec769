//! Core domain types and logic.

pub mod candle;
pub mod signal;
pub mod trade;
pub mod indicator;
pub mod strategy;
pub mod strategies;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
