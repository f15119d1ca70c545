//! Rule-based market summary for operators. Built from an evaluation, so
//! it always agrees with what the signal path saw.

use std::fmt;

use chrono::{DateTime, Utc};

use common::format::usd;
use common::Pattern;

use crate::conditions::Evaluation;

const BUY_CONFIDENCE: u32 = 60;
const BUY_CONDITIONS: usize = 4;
const WAIT_CONFIDENCE: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up { strong: bool },
    Down { strong: bool },
    Sideways,
}

impl Trend {
    pub fn classify(price: f64, sma7: f64, sma21: f64) -> Self {
        if sma7 > sma21 && price > sma21 {
            Trend::Up {
                strong: price > sma7,
            }
        } else if sma7 < sma21 && price < sma21 {
            Trend::Down {
                strong: price < sma7,
            }
        } else {
            Trend::Sideways
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up { strong: true } => f.write_str("Up (strong)"),
            Trend::Up { strong: false } => f.write_str("Up (moderate)"),
            Trend::Down { strong: true } => f.write_str("Down (strong)"),
            Trend::Down { strong: false } => f.write_str("Down (moderate)"),
            Trend::Sideways => f.write_str("Sideways"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Oversold,
    LowerNeutral,
    UpperNeutral,
    Overbought,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi < 30.0 {
            RsiZone::Oversold
        } else if rsi > 70.0 {
            RsiZone::Overbought
        } else if rsi < 50.0 {
            RsiZone::LowerNeutral
        } else {
            RsiZone::UpperNeutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RsiZone::Oversold => "Oversold (buying opportunity)",
            RsiZone::LowerNeutral => "Lower neutral zone",
            RsiZone::UpperNeutral => "Upper neutral zone",
            RsiZone::Overbought => "Overbought (caution)",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Wait,
    StayOut,
}

impl Recommendation {
    pub fn classify(confidence: u32, conditions: usize) -> Self {
        if confidence >= BUY_CONFIDENCE && conditions >= BUY_CONDITIONS {
            Recommendation::Buy
        } else if confidence >= WAIT_CONFIDENCE {
            Recommendation::Wait
        } else {
            Recommendation::StayOut
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recommendation::Buy => "BUY - favourable conditions",
            Recommendation::Wait => "WAIT - keep watching the setup",
            Recommendation::StayOut => "STAY OUT - not enough conditions",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSummary {
    pub symbol: String,
    pub price: f64,
    pub trend: Trend,
    pub rsi: f64,
    pub rsi_zone: RsiZone,
    pub pattern: Pattern,
    pub sma7: f64,
    pub sma21: f64,
    pub conditions: Vec<String>,
    pub confidence: u32,
    pub recommendation: Recommendation,
}

impl MarketSummary {
    /// Missing indicators fall back to neutral values (RSI 50, SMAs 0).
    pub fn from_evaluation(symbol: impl Into<String>, evaluation: &Evaluation) -> Self {
        let snapshot = &evaluation.indicators;
        let rsi = snapshot.rsi.unwrap_or(50.0);
        let sma7 = snapshot.sma7.unwrap_or_default();
        let sma21 = snapshot.sma21.unwrap_or_default();

        Self {
            symbol: symbol.into(),
            price: snapshot.price,
            trend: Trend::classify(snapshot.price, sma7, sma21),
            rsi,
            rsi_zone: RsiZone::classify(rsi),
            pattern: evaluation.pattern,
            sma7,
            sma21,
            conditions: evaluation.descriptions(),
            confidence: evaluation.confidence,
            recommendation: Recommendation::classify(
                evaluation.confidence,
                evaluation.condition_count(),
            ),
        }
    }

    /// Plain-text report for the command bot.
    pub fn render(&self, now: DateTime<Utc>) -> String {
        let conditions = if self.conditions.is_empty() {
            "  - none".to_string()
        } else {
            self.conditions
                .iter()
                .map(|c| format!("  - {c}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "MARKET ANALYSIS | {symbol}\n\n\
             Price: {price}\n\
             Trend: {trend}\n\
             RSI: {rsi:.1} - {rsi_zone}\n\
             Pattern: {pattern}\n\n\
             Moving averages:\n\
             \u{20} - SMA7: {sma7}\n\
             \u{20} - SMA21: {sma21}\n\n\
             Conditions met: {count}\n\
             {conditions}\n\n\
             Confidence: {confidence}%\n\
             Recommendation: {recommendation}\n\n\
             {time}",
            symbol = self.symbol,
            price = usd(self.price, 2),
            trend = self.trend,
            rsi = self.rsi,
            rsi_zone = self.rsi_zone,
            pattern = self.pattern,
            sma7 = usd(self.sma7, 2),
            sma21 = usd(self.sma21, 2),
            count = self.conditions.len(),
            confidence = self.confidence,
            recommendation = self.recommendation,
            time = now.format("%H:%M:%S UTC"),
        )
    }
}
