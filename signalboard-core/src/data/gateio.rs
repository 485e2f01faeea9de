//! Gate.io spot market data source (API v4).
//!
//! Candle rows are `[time(s), quote_volume, close, high, low, open,
//! base_volume, window_closed]`, oldest first.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::http::{build_client, get_json, opt_str_f64, secs_to_utc, value_f64, value_i64};
use super::provider::{MarketSource, SourceError, Ticker, Timeframe};
use crate::domain::{Candle, Instrument};

const DEFAULT_BASE_URL: &str = "https://api.gateio.ws/api/v4";
const MAX_CANDLES: usize = 1000;

#[derive(Debug, Deserialize)]
struct TickerRow {
    last: Option<String>,
    #[serde(default)]
    close: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrencyPair {
    id: String,
    #[serde(default)]
    trade_status: String,
}

pub struct GateioSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl GateioSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    fn pair(instrument: &Instrument) -> String {
        instrument.joined('_')
    }

    /// Gate.io reports unknown pairs as a 400 with an `INVALID_CURRENCY_PAIR` label.
    fn classify(pair: &str, err: SourceError) -> SourceError {
        match err {
            SourceError::Rejected(body) if body.contains("INVALID_CURRENCY") => {
                SourceError::SymbolNotFound {
                    symbol: pair.to_string(),
                }
            }
            other => other,
        }
    }
}

pub fn parse_candle_rows(rows: &[Vec<Value>]) -> Result<Vec<Candle>, SourceError> {
    let candles: Vec<Candle> = rows
        .iter()
        .filter_map(|row| {
            if row.len() < 7 {
                return None;
            }
            Some(Candle {
                timestamp: secs_to_utc(value_i64(&row[0])?)?,
                close: value_f64(&row[2])?,
                high: value_f64(&row[3])?,
                low: value_f64(&row[4])?,
                open: value_f64(&row[5])?,
                volume: value_f64(&row[6])?,
            })
        })
        .collect();

    if candles.is_empty() && !rows.is_empty() {
        return Err(SourceError::ResponseFormatChanged(
            "gateio candle rows could not be parsed".into(),
        ));
    }
    Ok(candles)
}

impl MarketSource for GateioSource {
    fn name(&self) -> &str {
        "gateio"
    }

    fn fetch_ohlcv(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let pair = Self::pair(instrument);
        let url = format!("{}/spot/candlesticks", self.base_url);
        let rows: Vec<Vec<Value>> = get_json(
            &self.client,
            &url,
            &[
                ("currency_pair", pair.clone()),
                ("interval", timeframe.as_str().to_string()),
                ("limit", limit.min(MAX_CANDLES).to_string()),
            ],
        )
        .map_err(|e| Self::classify(&pair, e))?;
        parse_candle_rows(&rows)
    }

    fn fetch_ticker(&self, instrument: &Instrument) -> Result<Ticker, SourceError> {
        let pair = Self::pair(instrument);
        let url = format!("{}/spot/tickers", self.base_url);
        let rows: Vec<TickerRow> = get_json(&self.client, &url, &[("currency_pair", pair.clone())])
            .map_err(|e| Self::classify(&pair, e))?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(SourceError::SymbolNotFound { symbol: pair })?;
        Ok(Ticker {
            last: opt_str_f64(row.last.as_deref()),
            close: opt_str_f64(row.close.as_deref()),
        })
    }

    fn load_catalog(&self) -> Result<HashSet<Instrument>, SourceError> {
        let url = format!("{}/spot/currency_pairs", self.base_url);
        let pairs: Vec<CurrencyPair> = get_json(&self.client, &url, &[])?;
        Ok(pairs
            .into_iter()
            .filter(|p| p.trade_status == "tradable")
            .filter_map(|p| Instrument::from_joined(&p.id, '_'))
            .collect())
    }
}
