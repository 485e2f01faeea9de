//! Fibonacci retracement levels of the recent high/low range.

use crate::domain::Candle;

pub const DEFAULT_FIB_WINDOW: usize = 200;

/// Retracement fractions measured up from the range low.
pub const FIB_RATIOS: [f64; 3] = [0.382, 0.5, 0.618];

/// Levels `low + ratio * (high - low)` over the last `window` candles, ascending.
///
/// Uses every candle when fewer than `window` exist. An empty slice, a
/// zero-width or a non-finite range yields no levels.
pub fn compute_fibonacci_levels(candles: &[Candle], window: usize) -> Vec<f64> {
    let start = candles.len().saturating_sub(window);
    let slice = &candles[start..];
    if slice.is_empty() {
        return Vec::new();
    }

    let high = slice.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = slice.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let range = high - low;
    if !range.is_finite() || range <= 0.0 {
        return Vec::new();
    }

    let mut levels: Vec<f64> = FIB_RATIOS.iter().map(|r| low + r * range).collect();
    levels.sort_by(|a, b| a.total_cmp(b));
    levels
}
