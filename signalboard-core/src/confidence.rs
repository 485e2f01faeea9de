//! Walk-forward confidence: historical hit rate of the trend rule.
//!
//! For every step `i` in the evaluation window the trend is recomputed from the
//! closes known at `i` (inclusive) and compared with the move to `i + 1`. Steps
//! where the trend is undetermined or the next move is under 0.1% are skipped.
//! With fewer than 25 qualifying trials the estimate is the fixed floor.
//!
//! This is an accuracy proxy for the trend rule over the same history, not a
//! forecast.

use serde::Serialize;

use crate::domain::{round_to, CONFIDENCE_FLOOR};
use crate::indicators::compute_trend;

pub const DEFAULT_MAX_TRADES: usize = 260;

/// First index ever evaluated; earlier steps lack enough warmup history.
const WARMUP_INDEX: usize = 220;
const MIN_TRIALS: usize = 25;
/// Next-step moves smaller than this fraction of the close are noise.
const NOISE_FRACTION: f64 = 0.001;

/// Raw walk-forward counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BacktestTally {
    pub trials: usize,
    pub hits: usize,
}

impl BacktestTally {
    /// Confidence percentage, or the floor for an undersized sample.
    pub fn confidence_pct(&self) -> f64 {
        if self.trials < MIN_TRIALS {
            return CONFIDENCE_FLOOR;
        }
        round_to(self.hits as f64 / self.trials as f64 * 100.0, 2)
    }
}

/// Index of the first evaluated step: `max(220, len - max_trades - 2)`.
pub fn window_start(len: usize, max_trades: usize) -> usize {
    WARMUP_INDEX.max(len.saturating_sub(max_trades + 2))
}

/// Run the walk-forward simulation and return the raw counts.
pub fn backtest_trend(closes: &[f64], max_trades: usize) -> BacktestTally {
    let mut tally = BacktestTally::default();
    if closes.len() < 2 {
        return tally;
    }

    for i in window_start(closes.len(), max_trades)..closes.len() - 1 {
        let Ok(reading) = compute_trend(&closes[..=i]) else {
            continue;
        };

        let current = closes[i];
        let next = closes[i + 1];
        if current == 0.0 || ((next - current) / current).abs() < NOISE_FRACTION {
            continue;
        }

        tally.trials += 1;
        if reading.direction.is_hit(current, next) {
            tally.hits += 1;
        }
    }

    tally
}

/// Confidence in `[0, 100]`, rounded to two decimals, or exactly 55.0 when
/// fewer than 25 trials qualify.
pub fn estimate_confidence(closes: &[f64], max_trades: usize) -> f64 {
    backtest_trend(closes, max_trades).confidence_pct()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::geometric_closes;

    #[test]
    fn window_start_clamps_to_warmup() {
        assert_eq!(window_start(300, 260), 220);
        assert_eq!(window_start(600, 260), 338);
        assert_eq!(window_start(10, 260), 220);
    }

    #[test]
    fn short_history_returns_floor() {
        let closes = geometric_closes(100.0, 0.01, 210);
        assert_eq!(estimate_confidence(&closes, DEFAULT_MAX_TRADES), CONFIDENCE_FLOOR);
        assert_eq!(estimate_confidence(&[], DEFAULT_MAX_TRADES), CONFIDENCE_FLOOR);
    }

    #[test]
    fn steady_uptrend_hits_every_trial() {
        // 300 closes: steps 220..=298 → 79 trials, all LONG and all up.
        let closes = geometric_closes(100.0, 0.01, 300);
        let tally = backtest_trend(&closes, DEFAULT_MAX_TRADES);
        assert_eq!(tally.trials, 79);
        assert_eq!(tally.hits, 79);
        assert_eq!(tally.confidence_pct(), 100.0);
    }

    #[test]
    fn noise_moves_are_skipped() {
        // 0.05% steps are below the 0.1% noise filter.
        let closes = geometric_closes(100.0, 0.0005, 300);
        let tally = backtest_trend(&closes, DEFAULT_MAX_TRADES);
        assert_eq!(tally.trials, 0);
        assert_eq!(estimate_confidence(&closes, DEFAULT_MAX_TRADES), CONFIDENCE_FLOOR);
    }

    #[test]
    fn alternating_moves_score_between_bounds() {
        // Uptrend with a pullback every third step.
        let mut closes = vec![100.0];
        for i in 1..320 {
            let prev: f64 = closes[i - 1];
            let step = if i % 3 == 0 { -0.01 } else { 0.015 };
            closes.push(prev * (1.0 + step));
        }
        let tally = backtest_trend(&closes, DEFAULT_MAX_TRADES);
        assert!(tally.trials >= 25);
        let pct = tally.confidence_pct();
        assert!(pct > 0.0 && pct < 100.0, "pct = {pct}");
        assert_eq!(pct, round_to(pct, 2));
    }

    #[test]
    fn max_trades_limits_the_window() {
        let closes = geometric_closes(100.0, 0.01, 600);
        let tally = backtest_trend(&closes, 100);
        // start = max(220, 600 - 102) = 498 → steps 498..=598
        assert_eq!(tally.trials, 101);
    }

    #[test]
    fn deterministic() {
        let closes = geometric_closes(20.0, 0.007, 320);
        assert_eq!(
            estimate_confidence(&closes, DEFAULT_MAX_TRADES),
            estimate_confidence(&closes, DEFAULT_MAX_TRADES)
        );
    }
}
