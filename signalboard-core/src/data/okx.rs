//! OKX spot market data source (API v5).

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::http::{build_client, get_json, millis_to_utc, opt_str_f64, value_f64, value_i64};
use super::provider::{MarketSource, SourceError, Ticker, Timeframe};
use crate::domain::{Candle, Instrument};

const DEFAULT_BASE_URL: &str = "https://www.okx.com";
const OK_CODE: &str = "0";
const INSTRUMENT_NOT_FOUND: &str = "51001";
/// `/market/candles` returns at most 300 rows per request.
const MAX_CANDLES: usize = 300;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    last: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentRow {
    inst_id: String,
    #[serde(default)]
    state: String,
}

pub struct OkxSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OkxSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
        })
    }

    fn inst_id(instrument: &Instrument) -> String {
        instrument.joined('-')
    }

    fn bar(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::OneHour => "1H",
            Timeframe::FourHours => "4H",
            Timeframe::OneDay => "1D",
        }
    }

    fn unwrap_envelope<T>(inst_id: &str, env: Envelope<T>) -> Result<Vec<T>, SourceError> {
        match env.code.as_str() {
            OK_CODE => Ok(env.data),
            INSTRUMENT_NOT_FOUND => Err(SourceError::SymbolNotFound {
                symbol: inst_id.to_string(),
            }),
            code => Err(SourceError::Other(format!("okx code {code}: {}", env.msg))),
        }
    }
}

/// OKX rows are `[ts(ms), open, high, low, close, volume, ...]`, newest first.
pub fn parse_candle_rows(rows: &[Vec<Value>]) -> Result<Vec<Candle>, SourceError> {
    let candles: Vec<Candle> = rows
        .iter()
        .filter_map(|row| {
            if row.len() < 6 {
                return None;
            }
            Some(Candle {
                timestamp: millis_to_utc(value_i64(&row[0])?)?,
                open: value_f64(&row[1])?,
                high: value_f64(&row[2])?,
                low: value_f64(&row[3])?,
                close: value_f64(&row[4])?,
                volume: value_f64(&row[5])?,
            })
        })
        .collect();

    if candles.is_empty() && !rows.is_empty() {
        return Err(SourceError::ResponseFormatChanged(
            "okx candle rows could not be parsed".into(),
        ));
    }
    Ok(candles)
}

impl MarketSource for OkxSource {
    fn name(&self) -> &str {
        "okx"
    }

    fn fetch_ohlcv(
        &self,
        instrument: &Instrument,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let inst_id = Self::inst_id(instrument);
        let url = format!("{}/api/v5/market/candles", self.base_url);
        let env: Envelope<Vec<Value>> = get_json(
            &self.client,
            &url,
            &[
                ("instId", inst_id.clone()),
                ("bar", Self::bar(timeframe).to_string()),
                ("limit", limit.min(MAX_CANDLES).to_string()),
            ],
        )?;
        let rows = Self::unwrap_envelope(&inst_id, env)?;
        parse_candle_rows(&rows)
    }

    fn fetch_ticker(&self, instrument: &Instrument) -> Result<Ticker, SourceError> {
        let inst_id = Self::inst_id(instrument);
        let url = format!("{}/api/v5/market/ticker", self.base_url);
        let env: Envelope<TickerRow> =
            get_json(&self.client, &url, &[("instId", inst_id.clone())])?;
        let row = Self::unwrap_envelope(&inst_id, env)?
            .into_iter()
            .next()
            .ok_or(SourceError::SymbolNotFound { symbol: inst_id })?;
        Ok(Ticker {
            last: opt_str_f64(row.last.as_deref()),
            close: None,
        })
    }

    fn load_catalog(&self) -> Result<HashSet<Instrument>, SourceError> {
        let url = format!("{}/api/v5/public/instruments", self.base_url);
        let env: Envelope<InstrumentRow> =
            get_json(&self.client, &url, &[("instType", "SPOT".to_string())])?;
        Ok(Self::unwrap_envelope("SPOT", env)?
            .into_iter()
            .filter(|row| row.state == "live")
            .filter_map(|row| Instrument::from_joined(&row.inst_id, '-'))
            .collect())
    }
}
