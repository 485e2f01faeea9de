//! Trend bias from an EMA(50)/EMA(200) gap plus a 30-step rate of change.
//!
//! Decision over the trailing 210 closes:
//! - gap > +0.05% and roc > +0.20% → LONG
//! - gap < -0.05% and roc < -0.20% → SHORT
//! - otherwise LONG if the last close sits at or above EMA(200), else SHORT
//!
//! The rule is binary: once 210 closes exist it never answers "neutral".

use serde::Serialize;

use super::ema::ema_last;
use super::roc::roc_pct;
use super::IndicatorError;
use crate::domain::Direction;

/// Minimum number of closes the trend rule needs.
pub const TREND_MIN_CLOSES: usize = 210;

const FAST_PERIOD: usize = 50;
const SLOW_PERIOD: usize = 200;
/// ROC base is `close[-31]`, i.e. 30 steps back from the last close.
const ROC_LOOKBACK: usize = 30;
const GAP_THRESHOLD_PCT: f64 = 0.05;
const ROC_THRESHOLD_PCT: f64 = 0.20;

/// Trend decision plus the intermediate values that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendReading {
    pub direction: Direction,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub gap_pct: f64,
    pub roc_pct: f64,
    pub last_close: f64,
}

/// Detect the trend from a close series (oldest first).
pub fn compute_trend(closes: &[f64]) -> Result<TrendReading, IndicatorError> {
    if closes.len() < TREND_MIN_CLOSES {
        return Err(IndicatorError::Unavailable {
            indicator: "trend",
            needed: TREND_MIN_CLOSES,
            got: closes.len(),
        });
    }

    let window = &closes[closes.len() - TREND_MIN_CLOSES..];
    let last_close = window[window.len() - 1];

    let (Some(ema_fast), Some(ema_slow)) =
        (ema_last(window, FAST_PERIOD), ema_last(window, SLOW_PERIOD))
    else {
        return Err(IndicatorError::TrendUndetermined("empty window".into()));
    };

    if ema_slow == 0.0 || !ema_slow.is_finite() || !ema_fast.is_finite() {
        return Err(IndicatorError::TrendUndetermined(format!(
            "degenerate EMA(200) = {ema_slow}"
        )));
    }
    let gap_pct = (ema_fast - ema_slow) / ema_slow * 100.0;

    let roc_pct = roc_pct(window, ROC_LOOKBACK).ok_or_else(|| {
        IndicatorError::TrendUndetermined("rate of change has a zero or non-finite base".into())
    })?;

    let direction = if gap_pct > GAP_THRESHOLD_PCT && roc_pct > ROC_THRESHOLD_PCT {
        Direction::Long
    } else if gap_pct < -GAP_THRESHOLD_PCT && roc_pct < -ROC_THRESHOLD_PCT {
        Direction::Short
    } else if last_close >= ema_slow {
        Direction::Long
    } else {
        Direction::Short
    };

    Ok(TrendReading {
        direction,
        ema_fast,
        ema_slow,
        gap_pct,
        roc_pct,
        last_close,
    })
}
