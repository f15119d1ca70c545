use common::{Candle, EntryZone};

/// Retracement ratios followed by the two extensions.
pub const FIB_RATIOS: [f64; 9] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0, 1.272, 1.618];

/// Price levels for a high/low swing.
///
/// Ratios up to 1.0 retrace down from the high (`high - diff * ratio`);
/// extensions project below the low (`low - diff * (ratio - 1)`).
#[derive(Debug, Clone, PartialEq)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    levels: [(f64, f64); 9],
}

impl FibonacciLevels {
    pub fn new(high: f64, low: f64) -> Self {
        let diff = high - low;
        let levels = FIB_RATIOS.map(|ratio| {
            let price = if ratio <= 1.0 {
                high - diff * ratio
            } else {
                low - diff * (ratio - 1.0)
            };
            (ratio, price)
        });
        Self { high, low, levels }
    }

    /// Price at one of the standard ratios.
    pub fn level(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|(r, _)| (r - ratio).abs() < 1e-9)
            .map(|&(_, price)| price)
    }

    /// `(ratio, price)` pairs in ratio order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels.iter().copied()
    }

    /// The 0.382–0.236 retracement band used as a default entry zone.
    pub fn golden_zone(&self) -> EntryZone {
        let diff = self.high - self.low;
        EntryZone::new(self.high - diff * 0.382, self.high - diff * 0.236)
    }
}

pub fn fibonacci_levels(high: f64, low: f64) -> FibonacciLevels {
    FibonacciLevels::new(high, low)
}

/// Highest high and lowest low of the last `lookback` candles.
pub fn recent_swing(candles: &[Candle], lookback: usize) -> Option<(f64, f64)> {
    let window = &candles[candles.len().saturating_sub(lookback)..];
    if window.is_empty() {
        return None;
    }
    let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    Some((high, low))
}
