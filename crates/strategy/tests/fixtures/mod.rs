#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::Candle;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap()
}

/// 100 hourly bars: a long flat base at 93,000, a choppy rally into the
/// 94,200-94,500 zone, and a bullish engulfing close at 94,350 on 1.5x
/// volume. sma7 ≈ 94,307, sma21 ≈ 94,012, rsi ≈ 43.3.
pub fn engulfing_setup() -> Vec<Candle> {
    let mut closes = vec![93_000.0; 85];
    closes.extend([
        94_800.0, 94_500.0, 94_700.0, 94_400.0, 94_600.0, 94_300.0, 94_550.0, 94_250.0,
        94_500.0, 94_200.0, 94_450.0, 94_150.0, 94_300.0, 94_200.0, 94_350.0,
    ]);

    let mut candles: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: start() + Duration::hours(i as i64),
                open,
                high: open.max(close) + 20.0,
                low: open.min(close) - 20.0,
                close,
                volume: 100.0,
            }
        })
        .collect();

    let last = candles.len() - 1;
    candles[last] = Candle {
        open: 94_150.0,
        high: 94_370.0,
        low: 94_140.0,
        close: 94_350.0,
        volume: 150.0,
        ..candles[last]
    };
    candles
}

/// Same market, but the last bar is a doji closing at the same price.
pub fn doji_setup() -> Vec<Candle> {
    let mut candles = engulfing_setup();
    let last = candles.len() - 1;
    candles[last] = Candle {
        open: 94_340.0,
        high: 94_450.0,
        low: 94_250.0,
        ..candles[last]
    };
    candles
}
