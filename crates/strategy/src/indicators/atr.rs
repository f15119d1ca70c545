use common::Candle;

/// Default look-back for ATR.
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// True range of `candle` given the previous bar's close.
pub fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    (candle.high - candle.low)
        .max((candle.high - prev_close).abs())
        .max((candle.low - prev_close).abs())
}

/// Average True Range: mean of the last `period` true ranges.
/// Returns `None` if fewer than `period + 1` candles are supplied.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }
    let window = &candles[candles.len() - period - 1..];
    let total: f64 = window
        .windows(2)
        .map(|w| true_range(&w[1], w[0].close))
        .sum();
    Some(total / period as f64)
}
