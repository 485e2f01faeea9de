//! Market data: exchange clients, pacing, circuit breaking and the fallback gateway.

pub mod circuit_breaker;
pub mod gateio;
pub mod gateway;
pub mod http;
pub mod kucoin;
pub mod okx;
pub mod provider;
pub mod rate_limit;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use gateio::GateioSource;
pub use gateway::{GatewayError, MarketDataGateway, DEFAULT_MIN_HISTORY};
pub use kucoin::KucoinSource;
pub use okx::OkxSource;
pub use provider::{MarketSource, SourceError, Ticker, Timeframe};
pub use rate_limit::{FixedInterval, RateLimiter, Unthrottled};

/// Source names accepted by [`build_source`], in default priority order.
pub const KNOWN_SOURCES: [&str; 3] = ["kucoin", "gateio", "okx"];

/// Construct a live exchange client by name.
pub fn build_source(name: &str) -> Result<Box<dyn MarketSource>, SourceError> {
    match name {
        "kucoin" => Ok(Box::new(KucoinSource::new()?)),
        "gateio" => Ok(Box::new(GateioSource::new()?)),
        "okx" => Ok(Box::new(OkxSource::new()?)),
        other => Err(SourceError::Other(format!(
            "unknown source '{other}' (expected one of {})",
            KNOWN_SOURCES.join(", ")
        ))),
    }
}
