//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR here is the simple mean of the last `period` true ranges (no Wilder
//! smoothing). Requires period+2 candles.

use super::IndicatorError;
use crate::domain::Candle;

pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Compute the True Range series from candles.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(candles.len());
    let Some(first) = candles.first() else {
        return tr;
    };
    tr.push(first.high - first.low);

    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let pc = prev.close;
        tr.push(
            (cur.high - cur.low)
                .max((cur.high - pc).abs())
                .max((cur.low - pc).abs()),
        );
    }

    tr
}

/// ATR over the most recent `period` true ranges.
///
/// TR[0] has no previous close and is never part of the average.
pub fn compute_atr(candles: &[Candle], period: usize) -> Result<f64, IndicatorError> {
    let needed = period + 2;
    if period == 0 || candles.len() < needed {
        return Err(IndicatorError::Unavailable {
            indicator: "atr",
            needed,
            got: candles.len(),
        });
    }

    let tr = true_range(candles);
    let window = &tr[tr.len() - period..];
    Ok(window.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, make_ohlc_candles, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        // Gap up: prev close 100, current candle 110-115-108
        let candles = make_ohlc_candles(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, |115-100|, |108-100|) = 15
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3_is_mean_of_last_three() {
        let candles = make_ohlc_candles(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10 (never averaged)
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        // Last 3 TR = [9, 6, 6]
        let atr = compute_atr(&candles, 3).unwrap();
        assert_approx(atr, 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_needs_period_plus_two() {
        let candles = make_candles(&[1.0; 15]);
        assert_eq!(
            compute_atr(&candles, 14),
            Err(IndicatorError::Unavailable {
                indicator: "atr",
                needed: 16,
                got: 15
            })
        );
        let candles = make_candles(&[1.0; 16]);
        assert!(compute_atr(&candles, 14).is_ok());
    }

    #[test]
    fn flat_market_is_zero_not_unavailable() {
        let candles = make_ohlc_candles(&[(5.0, 5.0, 5.0, 5.0); 20]);
        assert_eq!(compute_atr(&candles, 14), Ok(0.0));
    }

    #[test]
    fn zero_period_is_unavailable() {
        let candles = make_candles(&[1.0; 30]);
        assert!(compute_atr(&candles, 0).is_err());
    }
}
