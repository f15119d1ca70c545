use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use common::{MarketDataSource, Pattern, Result, TradingConfig, TradingSignal};
use notify::NotifierSet;
use strategy::{CooldownGate, Decision, EvaluationOutcome, GateState, SignalDetector};

/// Log a heartbeat every this many ticks.
const HEARTBEAT_EVERY: u64 = 60;

/// Short form of the last scored evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub pattern: Pattern,
    pub confidence: u32,
    pub conditions: usize,
    pub should_fire: bool,
}

/// Read-only snapshot published by the monitor after every tick.
#[derive(Debug, Clone)]
pub struct MonitorStatus {
    pub symbol: String,
    pub timeframe: String,
    pub exchange: String,
    pub started_at: DateTime<Utc>,
    pub checks: u64,
    pub signals_delivered: u64,
    pub last_check: Option<DateTime<Utc>>,
    pub last_price: Option<f64>,
    pub last_evaluation: Option<EvaluationSummary>,
    pub last_signal: Option<DateTime<Utc>>,
}

/// What one tick did.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub decision: Decision,
    /// `true` when a fired signal reached at least one channel.
    pub delivered: bool,
}

/// Cloneable handle for the command bot. Reads status and queries the
/// market-data source; never touches the cooldown gate.
#[derive(Clone)]
pub struct MonitorHandle {
    status: Arc<RwLock<MonitorStatus>>,
    source: Arc<dyn MarketDataSource>,
    detector: Arc<SignalDetector>,
    candle_limit: usize,
    check_interval: Duration,
    cooldown: Duration,
}

impl MonitorHandle {
    pub async fn status(&self) -> MonitorStatus {
        self.status.read().await.clone()
    }

    pub fn symbol(&self) -> &str {
        self.detector.symbol()
    }

    pub fn timeframe(&self) -> &str {
        self.detector.timeframe()
    }

    pub fn trading(&self) -> &TradingConfig {
        self.detector.trading()
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn candle_limit(&self) -> usize {
        self.candle_limit
    }

    pub async fn last_price(&self) -> Result<f64> {
        self.source.last_price(self.symbol()).await
    }

    /// Fetch a fresh window and score it without touching the cooldown.
    pub async fn evaluate_now(&self) -> Result<EvaluationOutcome> {
        let candles = self
            .source
            .candles(self.symbol(), self.timeframe(), self.candle_limit)
            .await?;
        Ok(self.detector.evaluate(&candles))
    }
}

/// The single sequential driver for one symbol. Owns the cooldown gate.
pub struct Monitor {
    detector: Arc<SignalDetector>,
    source: Arc<dyn MarketDataSource>,
    notifiers: NotifierSet,
    gate: CooldownGate,
    candle_limit: usize,
    check_interval: Duration,
    status: Arc<RwLock<MonitorStatus>>,
}

impl Monitor {
    pub fn new(
        detector: SignalDetector,
        source: Arc<dyn MarketDataSource>,
        notifiers: NotifierSet,
        candle_limit: usize,
        check_interval: Duration,
        cooldown_secs: u64,
    ) -> (Self, MonitorHandle) {
        let detector = Arc::new(detector);
        let gate = CooldownGate::new(cooldown_secs);
        let status = Arc::new(RwLock::new(MonitorStatus {
            symbol: detector.symbol().to_string(),
            timeframe: detector.timeframe().to_string(),
            exchange: source.name().to_string(),
            started_at: Utc::now(),
            checks: 0,
            signals_delivered: 0,
            last_check: None,
            last_price: None,
            last_evaluation: None,
            last_signal: None,
        }));

        let handle = MonitorHandle {
            status: status.clone(),
            source: source.clone(),
            detector: detector.clone(),
            candle_limit,
            check_interval,
            cooldown: Duration::from_secs(cooldown_secs),
        };

        let monitor = Monitor {
            detector,
            source,
            notifiers,
            gate,
            candle_limit,
            check_interval,
            status,
        };

        (monitor, handle)
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    /// One poll: gate check, fetch, evaluate, and on fire deliver to every
    /// channel before advancing the gate. The gate only moves when some
    /// channel accepted the signal.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome> {
        if let GateState::Cooling { remaining } = self.gate.state(now) {
            debug!(
                symbol = %self.detector.symbol(),
                remaining_secs = remaining.num_seconds(),
                "Cooling down, skipping fetch"
            );
            self.record_check(now, None, None).await;
            return Ok(TickOutcome {
                decision: Decision::Cooling { remaining },
                delivered: false,
            });
        }

        let candles = self
            .source
            .candles(self.detector.symbol(), self.detector.timeframe(), self.candle_limit)
            .await?;

        let decision = self.detector.poll(&candles, &self.gate, now);
        let summary = decision.evaluation().map(|e| EvaluationSummary {
            pattern: e.pattern,
            confidence: e.confidence,
            conditions: e.condition_count(),
            should_fire: e.should_fire,
        });
        self.record_check(now, candles.last_price(), summary).await;

        let delivered = match &decision {
            Decision::InsufficientData { bars, required } => {
                info!(bars, required, "Not enough candles yet");
                false
            }
            Decision::NoSignal(evaluation) => {
                debug!(
                    pattern = %evaluation.pattern,
                    confidence = evaluation.confidence,
                    conditions = evaluation.condition_count(),
                    "No signal"
                );
                false
            }
            Decision::Fire { signal, .. } => self.deliver(signal, now).await,
            Decision::Cooling { .. } => false,
        };

        Ok(TickOutcome {
            decision,
            delivered,
        })
    }

    async fn deliver(&mut self, signal: &TradingSignal, now: DateTime<Utc>) -> bool {
        info!(
            symbol = %signal.symbol,
            pattern = %signal.pattern,
            confidence = signal.confidence_score,
            price = signal.current_price,
            rr = signal.risk_reward_ratio,
            "Signal fired"
        );

        if !self.notifiers.deliver(signal).await {
            warn!(symbol = %signal.symbol, "Signal not delivered; gate stays armed");
            return false;
        }

        self.gate.record_delivery(now);
        let mut status = self.status.write().await;
        status.signals_delivered += 1;
        status.last_signal = Some(now);
        true
    }

    async fn record_check(
        &self,
        now: DateTime<Utc>,
        price: Option<f64>,
        summary: Option<EvaluationSummary>,
    ) {
        let mut status = self.status.write().await;
        status.checks += 1;
        status.last_check = Some(now);
        if price.is_some() {
            status.last_price = price;
        }
        if summary.is_some() {
            status.last_evaluation = summary;
        }
    }

    /// Poll forever at the check interval. Failed ticks are logged and the
    /// next tick proceeds. Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(
            symbol = %self.detector.symbol(),
            timeframe = %self.detector.timeframe(),
            exchange = %self.source.name(),
            interval_secs = self.check_interval.as_secs(),
            channels = ?self.notifiers.names(),
            "Monitor started"
        );

        let mut interval = tokio::time::interval(self.check_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;

        loop {
            interval.tick().await;
            ticks += 1;

            if let Err(e) = self.tick(Utc::now()).await {
                error!(symbol = %self.detector.symbol(), error = %e, "Monitor tick failed");
            }

            if ticks % HEARTBEAT_EVERY == 0 {
                let status = self.status.read().await;
                info!(
                    checks = status.checks,
                    signals = status.signals_delivered,
                    last_price = ?status.last_price,
                    "Monitor heartbeat"
                );
            }
        }
    }
}
