use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// One OHLCV bar. Geometry is derived on demand and never validated, so a
/// malformed bar (e.g. `high < low`) yields non-physical values instead of
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Ordered, timestamp-unique window of candles, most recent last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Sort by timestamp, collapse duplicate timestamps (the later entry wins)
    /// and keep only the newest `max_len` bars.
    pub fn from_candles(mut candles: Vec<Candle>, max_len: usize) -> Self {
        candles.sort_by_key(|c| c.timestamp);

        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        if deduped.len() > max_len {
            deduped.drain(..deduped.len() - max_len);
        }

        Self { candles: deduped }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Close of the most recent bar.
    pub fn last_price(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &[Candle] {
        &self.candles
    }
}

/// Candle pattern recognised on the last one or two bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pattern {
    Hammer,
    BullishEngulfing,
    BearishEngulfing,
    PinbarBullish,
    PinbarBearish,
    Doji,
    #[default]
    None,
}

impl Pattern {
    /// Patterns that satisfy the fire gate.
    pub fn is_bullish_reversal(&self) -> bool {
        matches!(
            self,
            Pattern::Hammer | Pattern::BullishEngulfing | Pattern::PinbarBullish
        )
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Hammer => write!(f, "HAMMER"),
            Pattern::BullishEngulfing => write!(f, "BULLISH_ENGULFING"),
            Pattern::BearishEngulfing => write!(f, "BEARISH_ENGULFING"),
            Pattern::PinbarBullish => write!(f, "PINBAR_BULLISH"),
            Pattern::PinbarBearish => write!(f, "PINBAR_BEARISH"),
            Pattern::Doji => write!(f, "DOJI"),
            Pattern::None => write!(f, "NONE"),
        }
    }
}

/// Direction of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Long,
    Short,
    Close,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalType::Long => write!(f, "LONG"),
            SignalType::Short => write!(f, "SHORT"),
            SignalType::Close => write!(f, "CLOSE"),
        }
    }
}

/// Inclusive price band in which an entry is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryZone {
    pub min: f64,
    pub max: f64,
}

impl EntryZone {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakeProfits {
    pub tp1: f64,
    pub tp2: Option<f64>,
    pub tp3: Option<f64>,
}

/// A fired trade-entry signal. Serializes to the flat JSON document that
/// notification sinks consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub signal_type: SignalType,
    pub symbol: String,
    pub entry_zone: EntryZone,
    pub stop_loss: f64,
    pub take_profits: TakeProfits,
    pub pattern: Pattern,
    pub confidence_score: f64,
    pub conditions_met: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub timeframe: String,
    pub current_price: f64,
    #[serde(serialize_with = "serialize_ratio")]
    pub risk_reward_ratio: f64,
    pub notes: String,
}

/// The wire format carries the ratio rounded to two decimals.
fn serialize_ratio<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}
