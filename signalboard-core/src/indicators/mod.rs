//! Indicator engine: ATR, EMA, rate of change, trend bias and Fibonacci levels.
//!
//! Every function here is pure over a borrowed candle or close slice, so the
//! same inputs always give the same outputs and results can be computed on any
//! thread. "Not enough data" is reported as [`IndicatorError::Unavailable`],
//! never as a zero value: an ATR of zero means a flat market.

pub mod atr;
pub mod ema;
pub mod fibonacci;
pub mod roc;
pub mod trend;

use thiserror::Error;

pub use atr::{compute_atr, true_range, DEFAULT_ATR_PERIOD};
pub use ema::{ema_last, ema_series};
pub use fibonacci::{compute_fibonacci_levels, DEFAULT_FIB_WINDOW, FIB_RATIOS};
pub use roc::roc_pct;
pub use trend::{compute_trend, TrendReading, TREND_MIN_CLOSES};

/// Why an indicator could not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{indicator} unavailable: need {needed} candles, got {got}")]
    Unavailable {
        indicator: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("trend undetermined: {0}")]
    TrendUndetermined(String),
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            crate::domain::Candle {
                timestamp: test_timestamp(i),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Candles from explicit (open, high, low, close) tuples, one day apart.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Candle> {
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| crate::domain::Candle {
            timestamp: test_timestamp(i),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

#[cfg(test)]
fn test_timestamp(i: usize) -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + chrono::Duration::days(i as i64)
}

/// Geometric close series: `start * (1 + step)^i`.
#[cfg(test)]
pub fn geometric_closes(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start * (1.0 + step).powi(i as i32)).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
