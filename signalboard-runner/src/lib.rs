//! Signalboard Runner: configuration, signal assembly, batch orchestration
//! and the atomic output writer.
//!
//! This crate builds on `signalboard-core` to provide:
//! - TOML configuration with defaults and validation
//! - Gateway construction from configured source names
//! - Per-instrument signal assembly with NO_DATA degradation
//! - Sequential, cancellable batch runs
//! - The `entrada.json` document, written atomically

pub mod assembler;
pub mod config;
pub mod output;

use std::sync::Arc;

use signalboard_core::data::{build_source, FixedInterval, MarketDataGateway, SourceError};

pub use assembler::{decide_side, gain_pct, BatchOutcome, SignalAssembler};
pub use config::{ConfigError, SignalConfig, DEFAULT_INSTRUMENTS};
pub use output::{write_document, EntryDocument, OutputError};

/// Live gateway over the configured sources, ranked in list order.
pub fn build_gateway(config: &SignalConfig) -> Result<MarketDataGateway, SourceError> {
    let limiter = Arc::new(FixedInterval::new(config.request_interval()));
    let mut gateway = MarketDataGateway::new(limiter).with_min_history(config.min_history);
    for (rank, name) in config.sources.iter().enumerate() {
        gateway.add_source(rank as u32, build_source(name)?);
    }
    Ok(gateway)
}
