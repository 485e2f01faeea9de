//! KuCoin spot market data source.
//!
//! Candles come from `/api/v1/market/candles` as
//! `[time(s), open, close, high, low, volume, turnover]` rows, newest first,
//! wrapped in a `{code, data}` envelope where `code == "200000"` means success.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::http::{build_client, get_json, opt_str_f64, secs_to_utc, value_f64, value_i64};
use super::provider::{MarketSource, SourceError, Ticker, Timeframe};
use crate::domain::{Candle, Instrument};

const DEFAULT_BASE_URL: &str = "https://api.kucoin.com";
const OK_CODE: &str = "200000";
/// KuCoin caps a single candles request at 1500 rows.
const MAX_CANDLES: usize = 1500;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Level1 {
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    enable_trading: bool,
}

pub struct KucoinSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl KucoinSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    fn market_id(instrument: &Instrument) -> String {
        instrument.joined('-')
    }

    fn interval(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::OneHour => "1hour",
            Timeframe::FourHours => "4hour",
            Timeframe::OneDay => "1day",
        }
    }

    fn unwrap_envelope<T>(symbol: &str, env: Envelope<T>) -> Result<T, SourceError> {
        if env.code != OK_CODE {
            let msg = env.msg.unwrap_or_default();
            if msg.to_ascii_lowercase().contains("symbol") {
                return Err(SourceError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            return Err(SourceError::Other(format!("kucoin code {}: {msg}", env.code)));
        }
        env.data.ok_or_else(|| SourceError::SymbolNotFound {
            symbol: symbol.to_string(),
        })
    }
}

/// Parse candle rows. Rows that fail to parse are skipped; an entirely
/// unparseable payload is a format change.
pub fn parse_candle_rows(rows: &[Vec<Value>]) -> Result<Vec<Candle>, SourceError> {
    let candles: Vec<Candle> = rows
        .iter()
        .filter_map(|row| {
            if row.len() < 6 {
                return None;
            }
            Some(Candle {
                timestamp: secs_to_utc(value_i64(&row[0])?)?,
                open: value_f64(&row[1])?,
                close: value_f64(&row[2])?,
                high: value_f64(&row[3])?,
                low: value_f64(&row[4])?,
                volume: value_f64(&row[5])?,
            })
        })
        .collect();

    if candles.is_empty() && !rows.is_empty() {
        return Err(SourceError::ResponseFormatChanged(
            "kucoin candle rows could not be parsed".into(),
        ));
    }
    Ok(candles)
}

impl MarketSource for KucoinSource {
    fn name(&self) -> &str {
        "kucoin"
    }

    fn fetch_ohlcv(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let symbol = Self::market_id(instrument);
        let limit = limit.min(MAX_CANDLES);
        let end = Utc::now().timestamp();
        let span = timeframe.duration().as_secs() as i64 * limit as i64;
        let url = format!("{}/api/v1/market/candles", self.base_url);
        let env: Envelope<Vec<Vec<Value>>> = get_json(
            &self.client,
            &url,
            &[
                ("symbol", symbol.clone()),
                ("type", Self::interval(timeframe).to_string()),
                ("startAt", (end - span).to_string()),
                ("endAt", end.to_string()),
            ],
        )?;
        let rows = Self::unwrap_envelope(&symbol, env)?;
        parse_candle_rows(&rows)
    }

    fn fetch_ticker(&self, instrument: &Instrument) -> Result<Ticker, SourceError> {
        let symbol = Self::market_id(instrument);
        let url = format!("{}/api/v1/market/orderbook/level1", self.base_url);
        let env: Envelope<Level1> = get_json(&self.client, &url, &[("symbol", symbol.clone())])?;
        let level1 = Self::unwrap_envelope(&symbol, env)?;
        Ok(Ticker {
            last: opt_str_f64(level1.price.as_deref()),
            close: None,
        })
    }

    fn load_catalog(&self) -> Result<HashSet<Instrument>, SourceError> {
        let url = format!("{}/api/v2/symbols", self.base_url);
        let env: Envelope<Vec<SymbolInfo>> = get_json(&self.client, &url, &[])?;
        let symbols = Self::unwrap_envelope("*", env)?;
        Ok(symbols
            .into_iter()
            .filter(|s| s.enable_trading)
            .filter_map(|s| Instrument::from_joined(&s.symbol, '-'))
            .collect())
    }
}
