//! Signal assembly: one entry record per instrument, and the sequential batch.
//!
//! For each instrument the pipeline is history → trend → ATR and Fibonacci
//! levels → target → gain → walk-forward confidence → side. Any data or
//! indicator failure degrades that instrument to a NO_DATA record; it never
//! aborts the batch.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use signalboard_core::confidence::estimate_confidence;
use signalboard_core::data::{GatewayError, MarketDataGateway, Timeframe};
use signalboard_core::domain::{
    round_price, round_to, Direction, Instrument, Mode, SignalRecord, SignalSide,
};
use signalboard_core::indicators::{
    compute_atr, compute_fibonacci_levels, compute_trend, IndicatorError,
};
use signalboard_core::target::select_target;

use crate::config::{ConfigError, SignalConfig};

/// Positional mode works on daily candles.
const POSITIONAL_TIMEFRAME: Timeframe = Timeframe::OneDay;

/// Why an instrument degraded to NO_DATA.
#[derive(Debug, Error)]
enum Degraded {
    #[error(transparent)]
    Data(#[from] GatewayError),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub records: Vec<SignalRecord>,
    /// Instruments requested, including any skipped by cancellation.
    pub total_instruments: usize,
    pub cancelled: bool,
    pub finished_at: DateTime<FixedOffset>,
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        self.records.len()
    }

    /// Records with a LONG or SHORT entry.
    pub fn actionable(&self) -> usize {
        self.records.iter().filter(|r| r.side.is_actionable()).count()
    }

    pub fn no_data(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.side == SignalSide::NoData)
            .count()
    }
}

pub struct SignalAssembler {
    gateway: MarketDataGateway,
    config: SignalConfig,
    offset: FixedOffset,
}

impl SignalAssembler {
    /// Validates `config` before accepting it.
    pub fn new(gateway: MarketDataGateway, config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset = config.utc_offset()?;
        Ok(Self {
            gateway,
            config,
            offset,
        })
    }

    /// Build the record for one instrument at `now`. Never fails: problems
    /// become a NO_DATA record.
    pub fn process(&self, instrument: &Instrument, now: DateTime<Utc>) -> SignalRecord {
        let local = now.with_timezone(&self.offset);
        let date = local.format("%Y-%m-%d").to_string();
        let time = local.format("%H:%M").to_string();

        match self.evaluate(instrument, date.clone(), time.clone()) {
            Ok(record) => {
                debug!(
                    %instrument,
                    side = %record.side,
                    price = record.price,
                    target = record.target,
                    gain_pct = record.gain_pct,
                    confidence_pct = record.confidence_pct,
                    "signal assembled"
                );
                record
            }
            Err(e) => {
                warn!(%instrument, error = %e, "no data for instrument");
                SignalRecord::no_data(instrument.clone(), date, time)
            }
        }
    }

    fn evaluate(
        &self,
        instrument: &Instrument,
        date: String,
        time: String,
    ) -> Result<SignalRecord, Degraded> {
        let cfg = &self.config;

        let series =
            self.gateway
                .fetch_history(instrument, POSITIONAL_TIMEFRAME, cfg.lookback_candles)?;
        let closes = series.closes();
        let trend = compute_trend(&closes)?;
        let price = self.gateway.fetch_price(instrument)?;

        let atr = match compute_atr(series.candles(), cfg.atr_period) {
            Ok(atr) => Some(atr),
            Err(e) => {
                debug!(%instrument, error = %e, "ATR unavailable, using percentage fallback");
                None
            }
        };
        let levels = compute_fibonacci_levels(series.candles(), cfg.fib_window);
        let target = select_target(price, trend.direction, atr, &levels, &cfg.target);

        let gain_pct = gain_pct(price, target, trend.direction);
        let confidence_pct = estimate_confidence(&closes, cfg.max_trades);
        let side = decide_side(trend.direction, gain_pct, cfg.min_gain_pct, cfg.max_gain_pct);

        Ok(SignalRecord {
            instrument: instrument.clone(),
            mode: Mode::Positional,
            side,
            price: round_price(price),
            target: round_price(target),
            gain_pct,
            confidence_pct,
            date,
            time,
        })
    }

    /// Process `instruments` in order. `cancel` is checked between instruments.
    pub fn run_batch(&self, instruments: &[Instrument], cancel: Option<&AtomicBool>) -> BatchOutcome {
        let start = Instant::now();
        let mut records = Vec::with_capacity(instruments.len());
        let mut cancelled = false;

        for instrument in instruments {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                cancelled = true;
                break;
            }
            records.push(self.process(instrument, Utc::now()));
        }

        let outcome = BatchOutcome {
            records,
            total_instruments: instruments.len(),
            cancelled,
            finished_at: Utc::now().with_timezone(&self.offset),
        };

        info!(
            processed = outcome.processed(),
            total = outcome.total_instruments,
            actionable = outcome.actionable(),
            no_data = outcome.no_data(),
            cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch finished"
        );

        outcome
    }
}

/// Expected gain in the trade direction, floored at zero and rounded to two
/// decimals. A non-positive price or target gives zero.
pub fn gain_pct(price: f64, target: f64, direction: Direction) -> f64 {
    if !(price > 0.0 && target > 0.0) {
        return 0.0;
    }
    let raw = match direction {
        Direction::Long => (target / price - 1.0) * 100.0,
        Direction::Short => (price / target - 1.0) * 100.0,
    };
    if raw.is_finite() {
        round_to(raw.max(0.0), 2)
    } else {
        0.0
    }
}

/// Entry side for a rounded gain. `max_gain_pct == 0` disables the upper bound.
pub fn decide_side(
    direction: Direction,
    gain_pct: f64,
    min_gain_pct: f64,
    max_gain_pct: f64,
) -> SignalSide {
    if gain_pct < min_gain_pct {
        return SignalSide::NoEntry;
    }
    if max_gain_pct > 0.0 && gain_pct > max_gain_pct {
        return SignalSide::NoEntry;
    }
    direction.into()
}
