use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quote asset used when a config entry names only the base coin.
pub const DEFAULT_QUOTE: &str = "USDT";

/// A spot trading pair: base asset priced in a quote asset.
///
/// This is the lookup key across every data source. Each source renders it
/// in its own market-id format (`BTC-USDT`, `BTC_USDT`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instrument {
    pub base: String,
    pub quote: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum InstrumentError {
    #[error("empty instrument symbol")]
    Empty,
    #[error("malformed instrument symbol '{0}' (expected BASE or BASE/QUOTE)")]
    Malformed(String),
}

impl Instrument {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_ascii_uppercase(),
            quote: quote.into().to_ascii_uppercase(),
        }
    }

    /// Parse `"BTC"` (quote defaults to `default_quote`) or `"BTC/USDT"`.
    pub fn parse_with_quote(s: &str, default_quote: &str) -> Result<Self, InstrumentError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InstrumentError::Empty);
        }
        match s.split_once('/') {
            None => Ok(Self::new(s, default_quote)),
            Some((base, quote)) => {
                if base.is_empty() || quote.is_empty() || quote.contains('/') {
                    return Err(InstrumentError::Malformed(s.to_string()));
                }
                Ok(Self::new(base, quote))
            }
        }
    }

    /// Market id joined with a separator: `joined('-')` → `BTC-USDT`.
    pub fn joined(&self, sep: char) -> String {
        format!("{}{sep}{}", self.base, self.quote)
    }

    /// Inverse of [`Instrument::joined`], used to parse exchange catalogs.
    pub fn from_joined(id: &str, sep: char) -> Option<Self> {
        let (base, quote) = id.split_once(sep)?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some(Self::new(base, quote))
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Instrument {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_quote(s, DEFAULT_QUOTE)
    }
}
