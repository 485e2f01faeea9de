//! Rounding helpers for prices spanning many orders of magnitude.

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Decimal places used for a price of this magnitude.
///
/// |v| >= 1 → 3, >= 0.01 → 6, >= 0.0001 → 8, else 10.
pub fn price_decimals(value: f64) -> u32 {
    let abs = value.abs();
    if abs >= 1.0 {
        3
    } else if abs >= 0.01 {
        6
    } else if abs >= 0.0001 {
        8
    } else {
        10
    }
}

/// Magnitude-adaptive price rounding, so sub-cent coins keep significant digits.
pub fn round_price(value: f64) -> f64 {
    round_to(value, price_decimals(value))
}
