//! Rate of Change (ROC).
//!
//! Percentage change between the last value and the value `period` steps back.
//! ROC = (last - values[len-1-period]) / values[len-1-period] * 100

/// ROC of the last value over `period` steps.
///
/// `None` when the slice is shorter than `period + 1`, when the base value is
/// zero, or when either value is not finite.
pub fn roc_pct(values: &[f64], period: usize) -> Option<f64> {
    let n = values.len();
    if n < period + 1 {
        return None;
    }
    let prev = values[n - 1 - period];
    let curr = values[n - 1];
    if !prev.is_finite() || !curr.is_finite() || prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}
