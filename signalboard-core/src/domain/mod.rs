//! Domain types for signalboard

pub mod candle;
pub mod instrument;
pub mod precision;
pub mod signal;

pub use candle::{Candle, PriceSeries};
pub use instrument::{Instrument, InstrumentError, DEFAULT_QUOTE};
pub use precision::{round_price, round_to};
pub use signal::{Direction, Mode, SignalRecord, SignalSide, CONFIDENCE_FLOOR};
