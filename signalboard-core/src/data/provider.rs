//! Market source trait and structured error types.
//!
//! The `MarketSource` trait abstracts over exchanges (KuCoin, Gate.io, OKX) so
//! the gateway can iterate them in priority order and tests can substitute
//! in-memory sources.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Candle, Instrument};

/// Structured errors for a single source call.
///
/// These are designed to be displayable in logs and carried as the "last
/// error" when every source fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by source (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("insufficient history: got {got} candles, need {needed}")]
    InsufficientHistory { got: usize, needed: usize },

    #[error("ticker has no usable last/close price")]
    NoPrice,

    #[error("source does not publish a market catalog")]
    CatalogUnsupported,

    #[error("circuit breaker open for this source")]
    CircuitOpen,

    #[error("source error: {0}")]
    Other(String),
}

impl SourceError {
    /// Failures that say something about the source's health, as opposed to
    /// the instrument or the payload.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            SourceError::NetworkUnreachable(_)
                | SourceError::RateLimited { .. }
                | SourceError::Other(_)
        )
    }
}

/// Candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    OneHour,
    FourHours,
    OneDay,
}

impl Timeframe {
    pub fn duration(self) -> Duration {
        match self {
            Timeframe::OneHour => Duration::from_secs(3_600),
            Timeframe::FourHours => Duration::from_secs(4 * 3_600),
            Timeframe::OneDay => Duration::from_secs(86_400),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
        }
    }
}

/// Point-in-time ticker snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub last: Option<f64>,
    pub close: Option<f64>,
}

impl Ticker {
    /// First of `last`, `close` that is a positive finite number.
    pub fn price(&self) -> Option<f64> {
        [self.last, self.close]
            .into_iter()
            .flatten()
            .find(|p| p.is_finite() && *p > 0.0)
    }
}

/// One exchange data source.
///
/// Implementations handle the specifics of a particular exchange's REST API.
/// Rate limiting, fallback and the minimum-history rule live in the gateway;
/// sources don't know about each other.
pub trait MarketSource: Send + Sync {
    /// Short stable name (`kucoin`, `gateio`, `okx`).
    fn name(&self) -> &str;

    /// Recent candles for `instrument`, in whatever order the exchange returns.
    fn fetch_ohlcv(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError>;

    /// Current ticker for `instrument`.
    fn fetch_ticker(&self, instrument: &Instrument) -> Result<Ticker, SourceError>;

    /// Instruments this source lists. Optional: the default reports the
    /// catalog as unsupported, which the gateway treats as "assume present".
    fn load_catalog(&self) -> Result<HashSet<Instrument>, SourceError> {
        Err(SourceError::CatalogUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_prefers_last_then_close() {
        let t = Ticker {
            last: Some(10.0),
            close: Some(9.0),
        };
        assert_eq!(t.price(), Some(10.0));
        let t = Ticker {
            last: None,
            close: Some(9.0),
        };
        assert_eq!(t.price(), Some(9.0));
        let t = Ticker {
            last: Some(0.0),
            close: Some(9.0),
        };
        assert_eq!(t.price(), Some(9.0));
        assert_eq!(Ticker::default().price(), None);
    }

    #[test]
    fn timeframe_labels_and_durations() {
        assert_eq!(Timeframe::FourHours.as_str(), "4h");
        assert_eq!(Timeframe::OneDay.duration().as_secs(), 86_400);
    }

    #[test]
    fn source_failure_classification() {
        assert!(SourceError::NetworkUnreachable("x".into()).is_source_failure());
        assert!(SourceError::RateLimited { retry_after_secs: 1 }.is_source_failure());
        assert!(!SourceError::SymbolNotFound { symbol: "X".into() }.is_source_failure());
        assert!(!SourceError::InsufficientHistory { got: 1, needed: 2 }.is_source_failure());
    }
}
