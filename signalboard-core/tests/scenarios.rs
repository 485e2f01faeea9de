//! End-to-end scenarios through the public core API: indicators, target
//! selection, confidence and the data gateway, with in-memory sources.

use chrono::TimeZone;
use std::collections::HashSet;
use std::sync::Arc;

use signalboard_core::confidence::{estimate_confidence, DEFAULT_MAX_TRADES};
use signalboard_core::data::{
    GatewayError, MarketDataGateway, MarketSource, SourceError, Ticker, Timeframe, Unthrottled,
};
use signalboard_core::domain::{Candle, Direction, Instrument};
use signalboard_core::indicators::{
    compute_atr, compute_fibonacci_levels, compute_trend, IndicatorError, TREND_MIN_CLOSES,
};
use signalboard_core::target::{select_target, TargetConfig};

fn rising_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 * 1.01_f64.powi(i as i32)).collect()
}

fn candles(closes: &[f64], spread: f64) -> Vec<Candle> {
    let base = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: base + chrono::Duration::days(i as i64),
            open: close,
            high: close + spread,
            low: close - spread,
            close,
            volume: 10.0,
        })
        .collect()
}

// ── Indicator and target scenarios ───────────────────────────────────

#[test]
fn steady_uptrend_reads_long_with_high_confidence() {
    let closes = rising_closes(TREND_MIN_CLOSES);
    let reading = compute_trend(&closes).unwrap();
    assert_eq!(reading.direction, Direction::Long);
    assert!(reading.gap_pct > 0.05 && reading.roc_pct > 0.20);

    // 210 closes leave no backtest window past warmup; a longer history of
    // the same trend scores every trial as a hit.
    assert_eq!(estimate_confidence(&closes, DEFAULT_MAX_TRADES), 55.0);
    let longer = rising_closes(300);
    assert!(estimate_confidence(&longer, DEFAULT_MAX_TRADES) > 55.0);
}

#[test]
fn flat_market_targets_the_percentage_fallback() {
    let flat = candles(&[250.0; 230], 0.0);
    let atr = compute_atr(&flat, 14).unwrap();
    assert_eq!(atr, 0.0);
    assert!(compute_fibonacci_levels(&flat, 200).is_empty());

    let config = TargetConfig::default();
    let long = select_target(250.0, Direction::Long, Some(atr), &[], &config);
    let short = select_target(250.0, Direction::Short, Some(atr), &[], &config);
    assert!((long - 257.5).abs() < 1e-9);
    assert!((short - 242.5).abs() < 1e-9);
}

#[test]
fn short_history_makes_trend_unavailable() {
    let closes = rising_closes(50);
    assert_eq!(
        compute_trend(&closes).unwrap_err(),
        IndicatorError::Unavailable {
            indicator: "trend",
            needed: TREND_MIN_CLOSES,
            got: 50,
        }
    );
}

#[test]
fn uptrend_target_uses_fibonacci_level_above_price() {
    // Rally to 200 then a pullback to 150 leaves the 0.618 level above price.
    let mut closes: Vec<f64> = (0..200).map(|i| 100.0 + i as f64 * 0.5).collect();
    closes.extend((0..30).map(|i| 199.5 - i as f64 * 1.7));
    let series = candles(&closes, 1.0);
    let price = *closes.last().unwrap();

    let atr = compute_atr(&series, 14).unwrap();
    let levels = compute_fibonacci_levels(&series, 200);
    let target = select_target(price, Direction::Long, Some(atr), &levels, &TargetConfig::default());

    let nearest_above = levels.iter().copied().find(|&l| l > price).unwrap();
    assert!(target >= nearest_above);
    assert!(target - price >= atr - 1e-9);
}

// ── Gateway scenarios ────────────────────────────────────────────────

struct FixedSource {
    name: &'static str,
    candles: usize,
}

impl MarketSource for FixedSource {
    fn name(&self) -> &str {
        self.name
    }

    fn fetch_ohlcv(&self, _: &Instrument, _: Timeframe, _: usize) -> Result<Vec<Candle>, SourceError> {
        let mut rows = candles(&rising_closes(self.candles), 0.5);
        rows.reverse();
        Ok(rows)
    }

    fn fetch_ticker(&self, _: &Instrument) -> Result<Ticker, SourceError> {
        Ok(Ticker {
            last: None,
            close: Some(123.0),
        })
    }

    fn load_catalog(&self) -> Result<HashSet<Instrument>, SourceError> {
        Err(SourceError::CatalogUnsupported)
    }
}

fn gateway(sizes: &[(&'static str, usize)]) -> MarketDataGateway {
    let mut gw = MarketDataGateway::new(Arc::new(Unthrottled));
    for (rank, &(name, candles)) in sizes.iter().enumerate() {
        gw.add_source(rank as u32, Box::new(FixedSource { name, candles }));
    }
    gw
}

#[test]
fn gateway_falls_back_to_source_with_enough_history() {
    let gw = gateway(&[("empty", 0), ("full", 260)]);
    let series = gw
        .fetch_history(&Instrument::new("SOL", "USDT"), Timeframe::OneDay, 300)
        .unwrap();

    assert_eq!(series.len(), 260);
    // Newest-first input comes back oldest first.
    let candles = series.candles();
    assert!(candles[0].timestamp < candles[candles.len() - 1].timestamp);
}

#[test]
fn gateway_reports_unavailable_when_every_source_is_short() {
    let gw = gateway(&[("a", 10), ("b", 100)]);
    let err = gw
        .fetch_history(&Instrument::new("SOL", "USDT"), Timeframe::OneDay, 300)
        .unwrap_err();

    let GatewayError::DataUnavailable {
        instrument,
        last_error,
    } = err;
    assert_eq!(instrument.to_string(), "SOL/USDT");
    assert_eq!(
        last_error,
        Some(SourceError::InsufficientHistory {
            got: 100,
            needed: 220
        })
    );
}

#[test]
fn gateway_price_uses_close_when_last_missing() {
    let gw = gateway(&[("a", 0)]);
    assert_eq!(gw.fetch_price(&Instrument::new("SOL", "USDT")), Ok(123.0));
}
