//! Signal record: one emitted entry per instrument per run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::instrument::{Instrument, DEFAULT_QUOTE};

/// Confidence assigned when the backtest sample is too small, and to every
/// degraded record.
pub const CONFIDENCE_FLOOR: f64 = 55.0;

/// Binary trend direction. Once enough history exists, the trend rule always
/// picks one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// True when the next close moved the way this direction predicted.
    pub fn is_hit(self, current: f64, next: f64) -> bool {
        match self {
            Direction::Long => next > current,
            Direction::Short => next < current,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("LONG"),
            Direction::Short => f.write_str("SHORT"),
        }
    }
}

/// Final side rendered in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalSide {
    #[serde(rename = "LONG")]
    Long,
    #[serde(rename = "SHORT")]
    Short,
    #[serde(rename = "NAO_ENTRAR")]
    NoEntry,
    #[serde(rename = "SEM_DADOS")]
    NoData,
}

impl SignalSide {
    pub fn is_actionable(self) -> bool {
        matches!(self, SignalSide::Long | SignalSide::Short)
    }

    /// Literal written to the `sinal` field.
    pub fn as_str(self) -> &'static str {
        match self {
            SignalSide::Long => "LONG",
            SignalSide::Short => "SHORT",
            SignalSide::NoEntry => "NAO_ENTRAR",
            SignalSide::NoData => "SEM_DADOS",
        }
    }
}

impl fmt::Display for SignalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Direction> for SignalSide {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Long => SignalSide::Long,
            Direction::Short => SignalSide::Short,
        }
    }
}

/// Holding-period mode. Only the multi-day positional mode is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "POSICIONAL")]
    Positional,
}

/// One entry signal as consumed by the dashboards.
///
/// Field names on the wire are fixed by the consumers (`par`, `modo`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(rename = "par", with = "base_symbol")]
    pub instrument: Instrument,
    #[serde(rename = "modo")]
    pub mode: Mode,
    #[serde(rename = "sinal")]
    pub side: SignalSide,
    #[serde(rename = "preco")]
    pub price: f64,
    #[serde(rename = "alvo")]
    pub target: f64,
    #[serde(rename = "ganho_pct")]
    pub gain_pct: f64,
    #[serde(rename = "assert_pct")]
    pub confidence_pct: f64,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
}

impl SignalRecord {
    /// Canonical degraded record: zero price/target/gain, confidence floor.
    pub fn no_data(instrument: Instrument, date: String, time: String) -> Self {
        Self {
            instrument,
            mode: Mode::Positional,
            side: SignalSide::NoData,
            price: 0.0,
            target: 0.0,
            gain_pct: 0.0,
            confidence_pct: CONFIDENCE_FLOOR,
            date,
            time,
        }
    }
}

/// `par` carries only the base asset; the quote is implied by the deployment.
mod base_symbol {
    use super::{Instrument, DEFAULT_QUOTE};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(inst: &Instrument, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&inst.base)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Instrument, D::Error> {
        let base = String::deserialize(d)?;
        Instrument::parse_with_quote(&base, DEFAULT_QUOTE).map_err(serde::de::Error::custom)
    }
}
