//! Weighted condition checklist and the fire decision.
//!
//! Every condition that holds adds its weight to the confidence score.
//! Firing additionally requires a bullish reversal pattern on the last bar;
//! that gate is a hard AND on top of the additive score.

use serde::{Deserialize, Serialize};

use common::format::usd;
use common::{Candle, EntryZone, Pattern, TradingConfig};

use crate::indicators::{atr, fibonacci_levels, recent_swing, rsi, sma};
use crate::indicators::{DEFAULT_ATR_PERIOD, DEFAULT_RSI_PERIOD};
use crate::patterns;

/// Bars required before any evaluation is attempted.
pub const MIN_BARS: usize = 50;
/// Bars used for the swing high/low when the entry zone is derived.
const SWING_LOOKBACK: usize = 50;
/// Last bar plus the nine bars its volume is compared against.
const VOLUME_WINDOW: usize = 10;
const VOLUME_SPIKE_FACTOR: f64 = 1.2;

const RSI_SUPPORT_LOW: f64 = 30.0;
const RSI_NEUTRAL_LOW: f64 = 50.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Confidence contributed by each condition. The defaults sum to exactly
/// 100 over the largest set of conditions that can hold together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionWeights {
    pub entry_zone: u32,
    pub bullish_pattern: u32,
    pub doji: u32,
    pub above_sma21: u32,
    pub trend_up: u32,
    pub rsi_support: u32,
    pub rsi_neutral: u32,
    pub volume_spike: u32,
    pub not_overbought: u32,
}

impl Default for ConditionWeights {
    fn default() -> Self {
        Self {
            entry_zone: 20,
            bullish_pattern: 25,
            doji: 10,
            above_sma21: 15,
            trend_up: 10,
            rsi_support: 15,
            rsi_neutral: 5,
            volume_spike: 10,
            not_overbought: 5,
        }
    }
}

/// One satisfied checklist item, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    InEntryZone(EntryZone),
    BullishReversal(Pattern),
    Doji,
    AboveSma21 { sma21: f64 },
    TrendUp,
    RsiSupport { rsi: f64 },
    RsiNeutral { rsi: f64 },
    VolumeSpike { ratio: f64 },
    NotOverbought,
}

impl Condition {
    pub fn weight(&self, weights: &ConditionWeights) -> u32 {
        match self {
            Condition::InEntryZone(_) => weights.entry_zone,
            Condition::BullishReversal(_) => weights.bullish_pattern,
            Condition::Doji => weights.doji,
            Condition::AboveSma21 { .. } => weights.above_sma21,
            Condition::TrendUp => weights.trend_up,
            Condition::RsiSupport { .. } => weights.rsi_support,
            Condition::RsiNeutral { .. } => weights.rsi_neutral,
            Condition::VolumeSpike { .. } => weights.volume_spike,
            Condition::NotOverbought => weights.not_overbought,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::InEntryZone(zone) => write!(
                f,
                "Price in entry zone ({}-{})",
                usd(zone.min, 0),
                usd(zone.max, 0)
            ),
            Condition::BullishReversal(pattern) => {
                write!(f, "Reversal pattern detected: {pattern}")
            }
            Condition::Doji => write!(f, "Doji detected (indecision)"),
            Condition::AboveSma21 { sma21 } => write!(f, "Price above SMA21 ({})", usd(*sma21, 0)),
            Condition::TrendUp => write!(f, "SMA7 above SMA21 (uptrend)"),
            Condition::RsiSupport { rsi } => write!(f, "RSI in support zone ({rsi:.1})"),
            Condition::RsiNeutral { rsi } => write!(f, "RSI neutral ({rsi:.1})"),
            Condition::VolumeSpike { ratio } => write!(f, "Volume above average ({ratio:.1}x)"),
            Condition::NotOverbought => write!(f, "RSI not overbought"),
        }
    }
}

/// Indicator values computed during an evaluation. `None` means the
/// window was too short for that indicator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub sma7: Option<f64>,
    pub sma21: Option<f64>,
    pub sma50: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    /// Last volume divided by the trailing average; `None` when the
    /// average is zero.
    pub volume_ratio: Option<f64>,
}

/// Full result of scoring one candle window.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub pattern: Pattern,
    pub conditions: Vec<Condition>,
    pub confidence: u32,
    pub should_fire: bool,
    /// Zone the price was checked against (configured or derived).
    pub entry_zone: EntryZone,
    pub indicators: IndicatorSnapshot,
}

impl Evaluation {
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Human-readable conditions in evaluation order.
    pub fn descriptions(&self) -> Vec<String> {
        self.conditions.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// Not enough bars to score; expected on cold start.
    InsufficientData { bars: usize, required: usize },
    Evaluated(Evaluation),
}

impl EvaluationOutcome {
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            EvaluationOutcome::Evaluated(evaluation) => Some(evaluation),
            EvaluationOutcome::InsufficientData { .. } => None,
        }
    }
}

/// The pattern gate: only bullish reversals may fire, whatever the score.
pub fn fire_decision(
    condition_count: usize,
    confidence: u32,
    pattern: Pattern,
    config: &TradingConfig,
) -> bool {
    condition_count >= config.min_conditions
        && confidence >= config.min_confidence
        && pattern.is_bullish_reversal()
}

#[derive(Debug, Clone, Default)]
pub struct ConditionEvaluator {
    pub weights: ConditionWeights,
    /// Also require `sma21 > sma50` for the trend condition.
    pub require_sma50_alignment: bool,
}

impl ConditionEvaluator {
    pub fn new(weights: ConditionWeights) -> Self {
        Self {
            weights,
            require_sma50_alignment: false,
        }
    }

    /// Score the window against `config`. The last close is the current price.
    pub fn evaluate(&self, candles: &[Candle], config: &TradingConfig) -> EvaluationOutcome {
        let Some(last) = candles.last().filter(|_| candles.len() >= MIN_BARS) else {
            return EvaluationOutcome::InsufficientData {
                bars: candles.len(),
                required: MIN_BARS,
            };
        };

        let price = last.close;
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let mut conditions = Vec::new();

        let entry_zone = config
            .entry_zone()
            .unwrap_or_else(|| derived_entry_zone(candles));
        if entry_zone.contains(price) {
            conditions.push(Condition::InEntryZone(entry_zone));
        }

        let pattern = patterns::detect(candles);
        match pattern {
            p if p.is_bullish_reversal() => conditions.push(Condition::BullishReversal(p)),
            Pattern::Doji => conditions.push(Condition::Doji),
            _ => {}
        }

        let sma7 = sma(&closes, 7);
        let sma21 = sma(&closes, 21);
        let sma50 = sma(&closes, 50);

        if let Some(sma21) = sma21 {
            if price > sma21 {
                conditions.push(Condition::AboveSma21 { sma21 });
            }
        }

        if let (Some(fast), Some(slow)) = (sma7, sma21) {
            let aligned = !self.require_sma50_alignment || sma50.is_some_and(|long| slow > long);
            if fast > slow && aligned {
                conditions.push(Condition::TrendUp);
            }
        }

        let rsi = rsi(&closes, DEFAULT_RSI_PERIOD);
        if let Some(rsi) = rsi {
            if (RSI_SUPPORT_LOW..RSI_NEUTRAL_LOW).contains(&rsi) {
                conditions.push(Condition::RsiSupport { rsi });
            } else if (RSI_NEUTRAL_LOW..RSI_OVERBOUGHT).contains(&rsi) {
                conditions.push(Condition::RsiNeutral { rsi });
            }
        }

        let volume_ratio = volume_ratio(candles);
        if let Some(ratio) = volume_ratio {
            if ratio > VOLUME_SPIKE_FACTOR {
                conditions.push(Condition::VolumeSpike { ratio });
            }
        }

        if rsi.is_some_and(|rsi| rsi < RSI_OVERBOUGHT) {
            conditions.push(Condition::NotOverbought);
        }

        let confidence = conditions
            .iter()
            .map(|c| c.weight(&self.weights))
            .sum::<u32>()
            .min(100);
        let should_fire = fire_decision(conditions.len(), confidence, pattern, config);

        EvaluationOutcome::Evaluated(Evaluation {
            pattern,
            conditions,
            confidence,
            should_fire,
            entry_zone,
            indicators: IndicatorSnapshot {
                price,
                sma7,
                sma21,
                sma50,
                rsi,
                atr: atr(candles, DEFAULT_ATR_PERIOD),
                volume_ratio,
            },
        })
    }
}

/// Fibonacci 0.382–0.236 band of the recent swing.
fn derived_entry_zone(candles: &[Candle]) -> EntryZone {
    let (high, low) = recent_swing(candles, SWING_LOOKBACK).unwrap_or((0.0, 0.0));
    fibonacci_levels(high, low).golden_zone()
}

/// Last volume relative to the mean of the preceding bars in the window.
fn volume_ratio(candles: &[Candle]) -> Option<f64> {
    let window = &candles[candles.len().saturating_sub(VOLUME_WINDOW)..];
    let (last, previous) = window.split_last()?;
    if previous.is_empty() {
        return None;
    }
    let average = previous.iter().map(|c| c.volume).sum::<f64>() / previous.len() as f64;
    if average <= 0.0 {
        return None;
    }
    Some(last.volume / average)
}
