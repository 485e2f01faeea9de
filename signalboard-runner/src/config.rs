//! Serializable signal run configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use signalboard_core::confidence::DEFAULT_MAX_TRADES;
use signalboard_core::data::{DEFAULT_MIN_HISTORY, KNOWN_SOURCES};
use signalboard_core::domain::{Instrument, DEFAULT_QUOTE};
use signalboard_core::indicators::{DEFAULT_ATR_PERIOD, DEFAULT_FIB_WINDOW};
use signalboard_core::target::TargetConfig;

/// The project's official coin list, alphabetical.
pub const DEFAULT_INSTRUMENTS: &[&str] = &[
    "AAVE", "ADA", "APE", "APT", "AR", "ARB", "ATOM", "AVAX", "AXS", "BAT", "BCH", "BLUR", "BNB",
    "BONK", "BTC", "COMP", "CRV", "DASH", "DGB", "DENT", "DOGE", "DOT", "EGLD", "EOS", "ETC",
    "ETH", "FET", "FIL", "FLOKI", "FLOW", "FTM", "GALA", "GLM", "GRT", "HBAR", "IMX", "INJ",
    "IOST", "ICP", "KAS", "KAVA", "KSM", "LINK", "LTC", "MANA", "MATIC", "MKR", "NEO", "NEAR",
    "OMG", "ONT", "OP", "ORDI", "PEPE", "QNT", "QTUM", "RNDR", "ROSE", "RUNE", "SAND", "SEI",
    "SHIB", "SNX", "SOL", "STX", "SUSHI", "TIA", "THETA", "TRX", "UNI", "VET", "XRP", "XEM",
    "XLM", "XVS", "ZEC", "ZRX",
];

/// Largest UTC offset, in hours, that a real timezone uses.
const MAX_OFFSET_HOURS: i32 = 14;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a signal run needs, passed explicitly into the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalConfig {
    /// Base symbols (`"BTC"`) or full pairs (`"BTC/USDT"`).
    pub instruments: Vec<String>,
    /// Quote asset for entries that name only the base.
    pub quote: String,
    pub min_gain_pct: f64,
    /// Gains above this are not entered. `0` disables the check.
    pub max_gain_pct: f64,
    pub atr_period: usize,
    pub fib_window: usize,
    /// Daily candles requested from each source.
    pub lookback_candles: usize,
    /// Candles a source must return for its history to be accepted.
    pub min_history: usize,
    /// Upper bound on walk-forward steps in the confidence backtest.
    pub max_trades: usize,
    /// Source names in priority order.
    pub sources: Vec<String>,
    /// Minimum spacing between outbound requests.
    pub request_interval_ms: u64,
    /// Fixed offset used for record dates and the document timestamp.
    pub utc_offset_hours: i32,
    pub output: PathBuf,
    pub target: TargetConfig,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            quote: DEFAULT_QUOTE.to_string(),
            min_gain_pct: 3.0,
            max_gain_pct: 50.0,
            atr_period: DEFAULT_ATR_PERIOD,
            fib_window: DEFAULT_FIB_WINDOW,
            lookback_candles: 300,
            min_history: DEFAULT_MIN_HISTORY,
            max_trades: DEFAULT_MAX_TRADES,
            sources: KNOWN_SOURCES.iter().map(|s| s.to_string()).collect(),
            request_interval_ms: 200,
            utc_offset_hours: -3,
            output: PathBuf::from("data/entrada.json"),
            target: TargetConfig::default(),
        }
    }
}

impl SignalConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.instruments.is_empty() {
            return invalid("instrument list is empty".into());
        }
        self.instruments()?;
        if self.atr_period == 0 {
            return invalid("atr_period must be at least 1".into());
        }
        if self.fib_window == 0 {
            return invalid("fib_window must be at least 1".into());
        }
        if self.min_gain_pct.is_nan() || self.min_gain_pct < 0.0 {
            return invalid(format!("min_gain_pct must be >= 0, got {}", self.min_gain_pct));
        }
        if self.max_gain_pct.is_nan() || self.max_gain_pct < 0.0 {
            return invalid(format!("max_gain_pct must be >= 0, got {}", self.max_gain_pct));
        }
        if self.max_gain_pct > 0.0 && self.max_gain_pct < self.min_gain_pct {
            return invalid(format!(
                "max_gain_pct ({}) is below min_gain_pct ({})",
                self.max_gain_pct, self.min_gain_pct
            ));
        }
        let pct = self.target.fallback_pct;
        if !(pct > 0.0 && pct < 100.0) {
            return invalid(format!("target.fallback_pct must be in (0, 100), got {pct}"));
        }
        if self.sources.is_empty() {
            return invalid("at least one source is required".into());
        }
        let mut seen = HashSet::new();
        for name in &self.sources {
            if !KNOWN_SOURCES.contains(&name.as_str()) {
                return invalid(format!(
                    "unknown source '{name}' (expected one of {})",
                    KNOWN_SOURCES.join(", ")
                ));
            }
            if !seen.insert(name.as_str()) {
                return invalid(format!("source '{name}' listed twice"));
            }
        }
        if self.lookback_candles < self.min_history {
            return invalid(format!(
                "lookback_candles ({}) is below min_history ({})",
                self.lookback_candles, self.min_history
            ));
        }
        if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&self.utc_offset_hours) {
            return invalid(format!(
                "utc_offset_hours must be within ±{MAX_OFFSET_HOURS}, got {}",
                self.utc_offset_hours
            ));
        }
        Ok(())
    }

    /// Configured instruments, parsed against the configured quote.
    pub fn instruments(&self) -> Result<Vec<Instrument>, ConfigError> {
        self.instruments
            .iter()
            .map(|s| {
                Instrument::parse_with_quote(s, &self.quote)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))
            })
            .collect()
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3_600).ok_or_else(|| {
            ConfigError::Invalid(format!("bad utc offset {}h", self.utc_offset_hours))
        })
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}
