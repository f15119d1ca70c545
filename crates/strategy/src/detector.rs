use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use common::{Candle, TradingConfig, TradingSignal};

use crate::conditions::{ConditionEvaluator, Evaluation, EvaluationOutcome};
use crate::cooldown::{CooldownGate, GateState};
use crate::signal::SignalAssembler;

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Gate is cooling; nothing was evaluated.
    Cooling { remaining: Duration },
    InsufficientData { bars: usize, required: usize },
    NoSignal(Evaluation),
    Fire {
        signal: TradingSignal,
        evaluation: Evaluation,
    },
}

impl Decision {
    pub fn signal(&self) -> Option<&TradingSignal> {
        match self {
            Decision::Fire { signal, .. } => Some(signal),
            _ => None,
        }
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            Decision::NoSignal(evaluation) | Decision::Fire { evaluation, .. } => Some(evaluation),
            _ => None,
        }
    }
}

/// Evaluator, assembler and trading block for one symbol.
///
/// Holds no mutable state: the cooldown gate belongs to the caller, which
/// records deliveries on it.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    evaluator: ConditionEvaluator,
    assembler: SignalAssembler,
    trading: TradingConfig,
}

impl SignalDetector {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        trading: TradingConfig,
    ) -> Self {
        Self {
            evaluator: ConditionEvaluator::default(),
            assembler: SignalAssembler::new(symbol, timeframe),
            trading,
        }
    }

    pub fn with_evaluator(mut self, evaluator: ConditionEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn symbol(&self) -> &str {
        self.assembler.symbol()
    }

    pub fn timeframe(&self) -> &str {
        self.assembler.timeframe()
    }

    pub fn trading(&self) -> &TradingConfig {
        &self.trading
    }

    /// Score the window regardless of the cooldown.
    pub fn evaluate(&self, candles: &[Candle]) -> EvaluationOutcome {
        self.evaluator.evaluate(candles, &self.trading)
    }

    /// Gate check, evaluation and, when firing, assembly stamped with `now`.
    pub fn poll(&self, candles: &[Candle], gate: &CooldownGate, now: DateTime<Utc>) -> Decision {
        if let GateState::Cooling { remaining } = gate.state(now) {
            debug!(
                symbol = %self.symbol(),
                remaining_secs = remaining.num_seconds(),
                "Cooldown active, skipping evaluation"
            );
            return Decision::Cooling { remaining };
        }

        match self.evaluate(candles) {
            EvaluationOutcome::InsufficientData { bars, required } => {
                Decision::InsufficientData { bars, required }
            }
            EvaluationOutcome::Evaluated(evaluation) if evaluation.should_fire => {
                let signal = self.assembler.assemble(&evaluation, &self.trading, now);
                Decision::Fire { signal, evaluation }
            }
            EvaluationOutcome::Evaluated(evaluation) => Decision::NoSignal(evaluation),
        }
    }
}
