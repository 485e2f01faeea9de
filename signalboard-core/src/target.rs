//! Target selection: nearest directional Fibonacci level, clamped by ATR.
//!
//! LONG looks for the nearest level strictly above the price, SHORT for the
//! nearest strictly below. Without a candidate the target falls back to an ATR
//! multiple, or to a fixed percentage when ATR is unavailable or zero. With a
//! candidate and a positive ATR the target is pushed out to at least
//! `floor_atr_mult` ATR, and a target still closer than `min_distance_atr` ATR
//! is replaced by a step multiple keyed on the candidate's own distance.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;

/// Distance thresholds (in ATR units) and the multiple applied at or above each.
const STEP_TABLE: [(f64, f64); 3] = [(2.2, 1.9), (1.6, 1.7), (1.1, 1.5)];
const STEP_DEFAULT: f64 = 1.25;

/// Tunables for [`select_target`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// ATR multiple used when no directional Fibonacci level exists.
    pub fallback_atr_mult: f64,
    /// Percent move used when there is no level and no usable ATR.
    pub fallback_pct: f64,
    /// Minimum target distance, in ATR, once a level is chosen.
    pub floor_atr_mult: f64,
    /// Targets closer than this many ATR are replaced by a step multiple.
    pub min_distance_atr: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            fallback_atr_mult: 1.5,
            fallback_pct: 3.0,
            floor_atr_mult: 1.0,
            min_distance_atr: 0.8,
        }
    }
}

/// Step multiple for a candidate `distance_atr` ATR away from the price.
pub fn step_multiplier(distance_atr: f64) -> f64 {
    STEP_TABLE
        .iter()
        .find(|(threshold, _)| distance_atr >= *threshold)
        .map(|&(_, mult)| mult)
        .unwrap_or(STEP_DEFAULT)
}

/// Nearest level on the trade side of `price`, if any.
pub fn directional_candidate(price: f64, direction: Direction, levels: &[f64]) -> Option<f64> {
    let sides = levels.iter().copied().filter(|l| l.is_finite());
    match direction {
        Direction::Long => sides.filter(|&l| l > price).min_by(f64::total_cmp),
        Direction::Short => sides.filter(|&l| l < price).max_by(f64::total_cmp),
    }
}

/// Pick a price target for `direction`.
///
/// `atr` of `None`, zero or non-finite counts as unavailable. An ATR distance
/// that would put a SHORT target at or below zero is replaced by the
/// percentage rule.
pub fn select_target(
    price: f64,
    direction: Direction,
    atr: Option<f64>,
    fib_levels: &[f64],
    config: &TargetConfig,
) -> f64 {
    let sign = match direction {
        Direction::Long => 1.0,
        Direction::Short => -1.0,
    };
    let atr = atr.filter(|a| a.is_finite() && *a > 0.0);
    let percent_target = price * (1.0 + sign * config.fallback_pct / 100.0);
    let positive_or_percent = |target: f64| if target > 0.0 { target } else { percent_target };

    let Some(candidate) = directional_candidate(price, direction, fib_levels) else {
        return match atr {
            Some(a) => positive_or_percent(price + sign * config.fallback_atr_mult * a),
            None => percent_target,
        };
    };

    let Some(atr) = atr else {
        return candidate;
    };

    // Distances are measured in the trade direction, so both are positive.
    let candidate_distance = sign * (candidate - price);
    let mut distance = candidate_distance.max(config.floor_atr_mult * atr);

    if distance < config.min_distance_atr * atr {
        distance = step_multiplier(candidate_distance / atr) * atr;
    }

    positive_or_percent(price + sign * distance)
}
