//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + k * (value[t] - EMA[t-1]), k = 2 / (period + 1)
//! A flat input stays exactly flat.
//! Seed: EMA[0] = value[0] (the first value of the window, not an SMA).

/// EMA over the whole slice, one output per input.
///
/// Returns an empty vector for an empty slice or `period == 0`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &v in &values[1..] {
        prev += k * (v - prev);
        result.push(prev);
    }

    result
}

/// Final EMA value of the slice, or `None` when the slice is empty.
pub fn ema_last(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_value() {
        let result = ema_series(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // Values: 10, 11, 12, 13
        // k = 2/(3+1) = 0.5, seed = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        // EMA[3] = 0.5*13 + 0.5*11.25 = 12.125
        let result = ema_series(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
        assert_eq!(ema_last(&[10.0, 11.0, 12.0, 13.0], 3), Some(result[3]));
    }

    #[test]
    fn ema_of_constant_is_constant() {
        let result = ema_series(&[7.5; 50], 20);
        assert!(result.iter().all(|&v| v == 7.5));
    }

    #[test]
    fn ema_empty_inputs() {
        assert!(ema_series(&[], 10).is_empty());
        assert!(ema_series(&[1.0], 0).is_empty());
        assert_eq!(ema_last(&[], 10), None);
    }
}
