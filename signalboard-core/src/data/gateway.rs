//! Multi-source fallback over market data sources.
//!
//! Sources are tried in ascending rank. A source is skipped when its catalog is
//! loaded and does not list the instrument, or when its circuit breaker is
//! open. The first accepted answer wins; nothing is cached between calls.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{MarketSource, SourceError, Timeframe};
use super::rate_limit::{RateLimiter, Unthrottled};
use crate::domain::{Instrument, PriceSeries};

/// Candles required before a history answer is accepted.
pub const DEFAULT_MIN_HISTORY: usize = 220;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("data unavailable for {instrument}: {}", describe_last(.last_error))]
    DataUnavailable {
        instrument: Instrument,
        last_error: Option<SourceError>,
    },
}

fn describe_last(last_error: &Option<SourceError>) -> String {
    match last_error {
        Some(e) => e.to_string(),
        None => "no eligible source".to_string(),
    }
}

struct SourceSlot {
    source: Box<dyn MarketSource>,
    rank: u32,
    /// `None` until a catalog load succeeds. Unloaded means "assume present".
    catalog: Option<HashSet<Instrument>>,
    catalog_attempted: bool,
    breaker: CircuitBreaker,
}

impl SourceSlot {
    fn lists(&self, instrument: &Instrument) -> bool {
        self.catalog
            .as_ref()
            .map_or(true, |catalog| catalog.contains(instrument))
    }
}

pub struct MarketDataGateway {
    slots: Vec<SourceSlot>,
    limiter: Arc<dyn RateLimiter>,
    min_history: usize,
}

impl Default for MarketDataGateway {
    fn default() -> Self {
        Self::new(Arc::new(Unthrottled))
    }
}

impl MarketDataGateway {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            slots: Vec::new(),
            limiter,
            min_history: DEFAULT_MIN_HISTORY,
        }
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    /// Register a source. Lower rank is tried first; equal ranks keep
    /// insertion order.
    pub fn add_source(&mut self, rank: u32, source: Box<dyn MarketSource>) {
        self.add_source_with_breaker(rank, source, CircuitBreaker::default_source());
    }

    pub fn add_source_with_breaker(
        &mut self,
        rank: u32,
        source: Box<dyn MarketSource>,
        breaker: CircuitBreaker,
    ) {
        self.slots.push(SourceSlot {
            source,
            rank,
            catalog: None,
            catalog_attempted: false,
            breaker,
        });
        self.slots.sort_by_key(|slot| slot.rank);
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.source.name()).collect()
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    /// Load every source's catalog once. Failures are logged and leave the
    /// catalog unloaded; later calls do not retry.
    pub fn load_catalogs(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.catalog_attempted) {
            slot.catalog_attempted = true;
            self.limiter.acquire();
            match slot.source.load_catalog() {
                Ok(catalog) => {
                    info!(source = slot.source.name(), markets = catalog.len(), "catalog loaded");
                    slot.catalog = Some(catalog);
                }
                Err(SourceError::CatalogUnsupported) => {
                    debug!(source = slot.source.name(), "source has no catalog");
                }
                Err(e) => {
                    warn!(source = slot.source.name(), error = %e, "catalog load failed");
                }
            }
        }
    }

    /// Ordered, deduplicated history with at least `min_history` candles.
    pub fn fetch_history(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<PriceSeries, GatewayError> {
        let needed = self.min_history;
        self.first_accepted(instrument, "history", |source| {
            let series = PriceSeries::from_unordered(source.fetch_ohlcv(instrument, timeframe, limit)?);
            if series.len() < needed {
                return Err(SourceError::InsufficientHistory {
                    got: series.len(),
                    needed,
                });
            }
            Ok(series)
        })
    }

    /// Live price: the ticker's `last`, else its `close`.
    pub fn fetch_price(&self, instrument: &Instrument) -> Result<f64, GatewayError> {
        self.first_accepted(instrument, "price", |source| {
            source.fetch_ticker(instrument)?.price().ok_or(SourceError::NoPrice)
        })
    }

    fn first_accepted<T>(
        &self,
        instrument: &Instrument,
        what: &'static str,
        attempt: impl Fn(&dyn MarketSource) -> Result<T, SourceError>,
    ) -> Result<T, GatewayError> {
        let mut last_error = None;

        for slot in &self.slots {
            let name = slot.source.name();
            if !slot.lists(instrument) {
                debug!(source = name, %instrument, "not listed, skipping");
                continue;
            }
            if !slot.breaker.is_allowed() {
                debug!(source = name, %instrument, "circuit open, skipping");
                last_error = Some(SourceError::CircuitOpen);
                continue;
            }

            self.limiter.acquire();
            let outcome = attempt(slot.source.as_ref());
            slot.breaker.observe(&outcome);

            match outcome {
                Ok(value) => {
                    debug!(source = name, %instrument, what, "accepted");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(source = name, %instrument, what, error = %e, "source failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(GatewayError::DataUnavailable {
            instrument: instrument.clone(),
            last_error,
        })
    }
}
