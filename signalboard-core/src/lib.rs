//! Signalboard Core: domain types, indicators, target selection, backtest
//! confidence and the exchange data gateway.
//!
//! This crate contains everything needed to turn market history into one
//! trading-entry decision:
//! - Domain types (candles, price series, instruments, signal records)
//! - Indicator engine (ATR, EMA/ROC trend bias, Fibonacci retracements)
//! - Target selection around Fibonacci levels with ATR clamps
//! - Walk-forward hit-rate backtest for confidence
//! - Multi-source market data gateway with circuit breaking and rate limiting

pub mod confidence;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod target;
