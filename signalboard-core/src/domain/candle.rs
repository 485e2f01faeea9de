//! Candle and PriceSeries, the fundamental market data units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single instrument over one timeframe interval.
///
/// Immutable once fetched: sources build candles, every consumer reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high/low bracket open and close,
    /// prices strictly positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }
}

/// Chronologically ordered, sane candles, oldest first, no duplicate timestamps.
///
/// The only way to build one is through [`PriceSeries::from_unordered`], which
/// sorts and de-duplicates raw exchange output (most exchanges return newest
/// first).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    candles: Vec<Candle>,
}

impl PriceSeries {
    /// Sort ascending by timestamp and drop later duplicates of a timestamp.
    /// Bars failing [`Candle::is_sane`] are discarded.
    pub fn from_unordered(mut candles: Vec<Candle>) -> Self {
        candles.retain(Candle::is_sane);
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Self { candles }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

impl AsRef<[Candle]> for PriceSeries {
    fn as_ref(&self) -> &[Candle] {
        &self.candles
    }
}
