pub mod analysis;
pub mod conditions;
pub mod cooldown;
pub mod detector;
pub mod indicators;
pub mod patterns;
pub mod presets;
pub mod signal;

pub use analysis::{MarketSummary, Recommendation, RsiZone, Trend};
pub use conditions::{
    fire_decision, Condition, ConditionEvaluator, ConditionWeights, Evaluation,
    EvaluationOutcome, IndicatorSnapshot, MIN_BARS,
};
pub use cooldown::{CooldownGate, GateState};
pub use detector::{Decision, SignalDetector};
pub use presets::{resolve_preset, PresetFile, TradingPreset};
pub use signal::{risk_reward, SignalAssembler};
