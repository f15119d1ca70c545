//! Candle pattern classification on the last one or two bars.
//!
//! Checks run in a fixed priority order and the first match wins, so
//! exactly one `Pattern` comes out of every call. Degenerate bars (zero
//! body or zero range) fail the ratio-based checks instead of dividing by
//! zero.

use common::{Candle, Pattern};

/// Lower wick must be at least this many bodies long for a hammer.
const HAMMER_WICK_RATIO: f64 = 2.0;
/// Pinbar: lower wick share of the range, and minimum body position.
const PINBAR_WICK_SHARE: f64 = 0.6;
const PINBAR_BODY_POSITION: f64 = 0.6;
/// Doji: body share of the range strictly below this.
const DOJI_BODY_SHARE: f64 = 0.1;

/// Previous bar bearish, current bar bullish, current body strictly
/// contains the previous body.
pub fn is_bullish_engulfing(current: &Candle, previous: &Candle) -> bool {
    previous.is_bearish()
        && current.is_bullish()
        && current.open < previous.close
        && current.close > previous.open
}

pub fn is_bearish_engulfing(current: &Candle, previous: &Candle) -> bool {
    previous.is_bullish()
        && current.is_bearish()
        && current.open > previous.close
        && current.close < previous.open
}

/// Long lower wick (>= 2x body), upper wick shorter than the body and
/// shorter than the lower wick.
pub fn is_hammer(candle: &Candle) -> bool {
    let body = candle.body();
    if body <= 0.0 {
        return false;
    }
    let lower = candle.lower_wick();
    let upper = candle.upper_wick();
    lower >= body * HAMMER_WICK_RATIO && upper < body && lower > upper
}

/// Lower wick covers most of the range and the body sits in the top part.
pub fn is_pinbar_bullish(candle: &Candle) -> bool {
    let range = candle.range();
    if range <= 0.0 {
        return false;
    }
    let wick_share = candle.lower_wick() / range;
    let body_position = (candle.open.min(candle.close) - candle.low) / range;
    wick_share >= PINBAR_WICK_SHARE && body_position >= PINBAR_BODY_POSITION
}

pub fn is_doji(candle: &Candle) -> bool {
    let range = candle.range();
    if range <= 0.0 {
        return false;
    }
    candle.body() / range < DOJI_BODY_SHARE
}

/// Classify the most recent bar (using the bar before it for two-bar
/// patterns). Fewer than two candles always yields `Pattern::None`.
pub fn detect(candles: &[Candle]) -> Pattern {
    let [.., previous, current] = candles else {
        return Pattern::None;
    };

    if is_bullish_engulfing(current, previous) {
        Pattern::BullishEngulfing
    } else if is_bearish_engulfing(current, previous) {
        Pattern::BearishEngulfing
    } else if is_hammer(current) {
        Pattern::Hammer
    } else if is_pinbar_bullish(current) {
        Pattern::PinbarBullish
    } else if is_doji(current) {
        Pattern::Doji
    } else {
        Pattern::None
    }
}
