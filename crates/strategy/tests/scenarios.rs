mod fixtures;

use chrono::Duration;
use common::{Pattern, SignalType, TradingConfig};
use strategy::{
    Condition, CooldownGate, Decision, EvaluationOutcome, MarketSummary, Recommendation,
    SignalDetector, TradingPreset, Trend, MIN_BARS,
};

fn detector() -> SignalDetector {
    SignalDetector::new("BTCUSDT", "1h", TradingConfig::default())
}

#[test]
fn ten_candles_is_insufficient_data() {
    let candles = fixtures::engulfing_setup();
    let gate = CooldownGate::new(3600);
    let decision = detector().poll(&candles[..10], &gate, fixtures::start());
    assert_eq!(
        decision,
        Decision::InsufficientData {
            bars: 10,
            required: MIN_BARS
        }
    );
}

#[test]
fn engulfing_in_zone_fires() {
    let candles = fixtures::engulfing_setup();
    let gate = CooldownGate::new(3600);
    let now = candles[candles.len() - 1].timestamp;

    let decision = detector().poll(&candles, &gate, now);
    let Decision::Fire { signal, evaluation } = decision else {
        panic!("expected a signal, got {decision:?}");
    };

    assert_eq!(evaluation.pattern, Pattern::BullishEngulfing);
    assert_eq!(evaluation.condition_count(), 7);
    assert_eq!(evaluation.confidence, 100);

    let snapshot = &evaluation.indicators;
    assert!((snapshot.sma7.unwrap() - 94_307.142_857).abs() < 1e-3);
    assert!((snapshot.sma21.unwrap() - 94_011.904_762).abs() < 1e-3);
    assert!((snapshot.rsi.unwrap() - 43.283_582).abs() < 1e-3);
    assert!((snapshot.volume_ratio.unwrap() - 1.5).abs() < 1e-9);

    assert_eq!(signal.signal_type, SignalType::Long);
    assert_eq!(signal.current_price, 94_350.0);
    assert_eq!(signal.timestamp, now);
    assert!((signal.risk_reward_ratio - 1450.0 / 1350.0).abs() < 1e-9);
    assert_eq!(
        signal.conditions_met[..2],
        [
            "Price in entry zone ($94,200-$94,500)".to_string(),
            "Reversal pattern detected: BULLISH_ENGULFING".to_string(),
        ]
    );
    assert_eq!(
        signal.notes,
        "Pullback into the Fibonacci golden zone. ATR: $282.14"
    );

    let json = serde_json::to_value(&signal).unwrap();
    assert_eq!(json["risk_reward_ratio"], 1.07);
    assert_eq!(json["pattern"], "BULLISH_ENGULFING");
}

#[test]
fn summary_agrees_with_the_evaluation() {
    let candles = fixtures::engulfing_setup();
    let outcome = detector().evaluate(&candles);
    let evaluation = outcome.evaluation().unwrap();

    let summary = MarketSummary::from_evaluation("BTCUSDT", evaluation);
    assert_eq!(summary.trend, Trend::Up { strong: true });
    assert_eq!(summary.recommendation, Recommendation::Buy);
    assert_eq!(summary.conditions, evaluation.descriptions());

    let text = summary.render(fixtures::start());
    assert!(text.contains("Pattern: BULLISH_ENGULFING"));
    assert!(text.contains("Conditions met: 7"));
    assert!(text.contains("  - Reversal pattern detected: BULLISH_ENGULFING"));
    assert!(text.contains("Confidence: 100%"));
}

#[test]
fn doji_scores_but_never_fires() {
    let candles = fixtures::doji_setup();
    let outcome = detector().evaluate(&candles);
    let EvaluationOutcome::Evaluated(evaluation) = outcome else {
        panic!("expected an evaluation");
    };

    assert_eq!(evaluation.pattern, Pattern::Doji);
    assert!(evaluation.conditions.contains(&Condition::Doji));
    assert_eq!(evaluation.condition_count(), 7);
    assert_eq!(evaluation.confidence, 85);
    assert!(!evaluation.should_fire);
}

#[test]
fn cooldown_blocks_repeat_then_rearms() {
    let candles = fixtures::engulfing_setup();
    let detector = detector();
    let mut gate = CooldownGate::new(3600);
    let t = candles[candles.len() - 1].timestamp;

    let first = detector.poll(&candles, &gate, t);
    assert!(first.signal().is_some());
    gate.record_delivery(t);

    let halfway = detector.poll(&candles, &gate, t + Duration::minutes(30));
    assert!(matches!(halfway, Decision::Cooling { .. }));

    let after = detector.poll(&candles, &gate, t + Duration::seconds(3601));
    assert!(after.signal().is_some());
}

#[test]
fn undelivered_signal_keeps_gate_armed() {
    let candles = fixtures::engulfing_setup();
    let detector = detector();
    let gate = CooldownGate::new(3600);
    let t = candles[candles.len() - 1].timestamp;

    // no sink accepted the first signal, so nothing is recorded
    assert!(detector.poll(&candles, &gate, t).signal().is_some());
    assert!(detector
        .poll(&candles, &gate, t + Duration::minutes(1))
        .signal()
        .is_some());
}

#[test]
fn scalp_zone_misses_the_setup() {
    let candles = fixtures::engulfing_setup();
    let detector = SignalDetector::new("BTCUSDT", "1h", TradingPreset::Scalp.config());
    let evaluation = detector.evaluate(&candles).evaluation().cloned().unwrap();

    assert!(!evaluation
        .conditions
        .iter()
        .any(|c| matches!(c, Condition::InEntryZone(_))));
    assert_eq!(evaluation.confidence, 80);
    // still above the looser scalp thresholds
    assert!(evaluation.should_fire);
}
