use chrono::{DateTime, Utc};

use common::format::usd;
use common::{EntryZone, SignalType, TakeProfits, TradingConfig, TradingSignal};

use crate::conditions::Evaluation;

/// Reward over risk measured from the middle of the entry zone.
/// A stop at or above the midpoint has no meaningful risk and yields 0.
pub fn risk_reward(zone: &EntryZone, stop_loss: f64, tp1: f64) -> f64 {
    let entry = zone.midpoint();
    let risk = entry - stop_loss;
    let reward = tp1 - entry;
    if risk > 0.0 {
        reward / risk
    } else {
        0.0
    }
}

/// Turns a firing evaluation into the signal record sent to notifiers.
#[derive(Debug, Clone)]
pub struct SignalAssembler {
    symbol: String,
    timeframe: String,
}

impl SignalAssembler {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    /// Always produces a `Long` signal; the evaluator only fires on bullish
    /// reversals. Conditions keep their evaluation order.
    pub fn assemble(
        &self,
        evaluation: &Evaluation,
        config: &TradingConfig,
        now: DateTime<Utc>,
    ) -> TradingSignal {
        let zone = evaluation.entry_zone;
        let notes = match evaluation.indicators.atr {
            Some(atr) => format!(
                "Pullback into the Fibonacci golden zone. ATR: {}",
                usd(atr, 2)
            ),
            None => "Pullback into the Fibonacci golden zone.".to_string(),
        };

        TradingSignal {
            signal_type: SignalType::Long,
            symbol: self.symbol.clone(),
            entry_zone: zone,
            stop_loss: config.stop_loss,
            take_profits: TakeProfits {
                tp1: config.tp1,
                tp2: config.tp2,
                tp3: config.tp3,
            },
            pattern: evaluation.pattern,
            confidence_score: f64::from(evaluation.confidence),
            conditions_met: evaluation.descriptions(),
            timestamp: now,
            timeframe: self.timeframe.clone(),
            current_price: evaluation.indicators.price,
            risk_reward_ratio: risk_reward(&zone, config.stop_loss, config.tp1),
            notes,
        }
    }
}
