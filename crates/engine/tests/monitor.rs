#[path = "../../strategy/tests/fixtures/mod.rs"]
mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;

use common::{Candle, CandleSeries, Error, MarketDataSource, Notifier, Result, TradingConfig, TradingSignal};
use engine::Monitor;
use notify::NotifierSet;
use strategy::{Decision, SignalDetector};

use fixtures::{engulfing_setup, start};

// ─── Fakes ────────────────────────────────────────────────────────────────────

struct FixedMarket {
    candles: Vec<Candle>,
    fetches: AtomicUsize,
}

#[async_trait]
impl MarketDataSource for FixedMarket {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn candles(&self, _symbol: &str, _timeframe: &str, limit: usize) -> Result<CandleSeries> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(CandleSeries::from_candles(self.candles.clone(), limit))
    }

    async fn last_price(&self, _symbol: &str) -> Result<f64> {
        self.candles
            .last()
            .map(|c| c.close)
            .ok_or_else(|| Error::Exchange("empty".into()))
    }
}

struct DownMarket;

#[async_trait]
impl MarketDataSource for DownMarket {
    fn name(&self) -> &str {
        "down"
    }

    async fn candles(&self, _symbol: &str, _timeframe: &str, _limit: usize) -> Result<CandleSeries> {
        Err(Error::Http("connection refused".into()))
    }

    async fn last_price(&self, _symbol: &str) -> Result<f64> {
        Err(Error::Http("connection refused".into()))
    }
}

struct CountingSink {
    accept: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Notifier for CountingSink {
    fn name(&self) -> &str {
        "counting"
    }

    async fn deliver(&self, _signal: &TradingSignal) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.accept {
            Ok(())
        } else {
            Err(Error::notification("counting", "rejected"))
        }
    }
}

fn monitor_with(
    source: Arc<dyn MarketDataSource>,
    accept: bool,
) -> (Monitor, engine::MonitorHandle, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut notifiers = NotifierSet::new();
    notifiers.push(CountingSink {
        accept,
        calls: calls.clone(),
    });
    let detector = SignalDetector::new("BTCUSDT", "1h", TradingConfig::default());
    let (monitor, handle) = Monitor::new(detector, source, notifiers, 100, Duration::from_secs(60), 3600);
    (monitor, handle, calls)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delivered_signal_starts_cooldown_then_rearms() {
    let market = Arc::new(FixedMarket {
        candles: engulfing_setup(),
        fetches: AtomicUsize::new(0),
    });
    let (mut monitor, handle, calls) = monitor_with(market.clone(), true);
    let t = start() + ChronoDuration::days(5);

    let first = monitor.tick(t).await.unwrap();
    assert!(first.delivered);
    assert!(first.decision.signal().is_some());

    let halfway = monitor.tick(t + ChronoDuration::minutes(30)).await.unwrap();
    assert!(matches!(halfway.decision, Decision::Cooling { .. }));
    // cooling ticks skip the fetch
    assert_eq!(market.fetches.load(Ordering::SeqCst), 1);

    let later = monitor.tick(t + ChronoDuration::seconds(3601)).await.unwrap();
    assert!(later.delivered);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let status = handle.status().await;
    assert_eq!(status.checks, 3);
    assert_eq!(status.signals_delivered, 2);
    assert_eq!(status.last_signal, Some(t + ChronoDuration::seconds(3601)));
    assert_eq!(status.last_price, Some(94_350.0));
    assert_eq!(status.last_evaluation.unwrap().confidence, 100);
}

#[tokio::test]
async fn failed_delivery_keeps_gate_armed() {
    let market = Arc::new(FixedMarket {
        candles: engulfing_setup(),
        fetches: AtomicUsize::new(0),
    });
    let (mut monitor, _handle, calls) = monitor_with(market, false);
    let t = start() + ChronoDuration::days(5);

    let first = monitor.tick(t).await.unwrap();
    assert!(!first.delivered);
    assert!(monitor.gate().last_signal().is_none());

    // retried on the very next tick
    let second = monitor.tick(t + ChronoDuration::minutes(1)).await.unwrap();
    assert!(second.decision.signal().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn short_history_reports_insufficient_data() {
    let market = Arc::new(FixedMarket {
        candles: engulfing_setup()[..10].to_vec(),
        fetches: AtomicUsize::new(0),
    });
    let (mut monitor, _handle, calls) = monitor_with(market, true);

    let outcome = monitor.tick(start()).await.unwrap();
    assert!(matches!(
        outcome.decision,
        Decision::InsufficientData { bars: 10, .. }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_error_surfaces_from_tick() {
    let (mut monitor, handle, _calls) = monitor_with(Arc::new(DownMarket), true);
    assert!(matches!(monitor.tick(start()).await, Err(Error::Http(_))));
    assert!(handle.last_price().await.is_err());
}

#[tokio::test]
async fn handle_evaluates_without_touching_the_gate() {
    let market = Arc::new(FixedMarket {
        candles: engulfing_setup(),
        fetches: AtomicUsize::new(0),
    });
    let (monitor, handle, calls) = monitor_with(market, true);

    let outcome = handle.evaluate_now().await.unwrap();
    assert!(outcome.evaluation().unwrap().should_fire);
    assert_eq!(handle.last_price().await.unwrap(), 94_350.0);
    assert!(monitor.gate().last_signal().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn run_polls_on_the_interval() {
    let market = Arc::new(FixedMarket {
        candles: engulfing_setup(),
        fetches: AtomicUsize::new(0),
    });
    let (monitor, handle, calls) = monitor_with(market.clone(), true);

    let task = tokio::spawn(monitor.run());
    // ticks at 0s, 60s, 120s and 180s
    tokio::time::sleep(Duration::from_secs(181)).await;
    task.abort();

    let status = handle.status().await;
    assert_eq!(status.checks, 4);
    assert_eq!(status.signals_delivered, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // every tick after the first is cooling and skips the fetch
    assert_eq!(market.fetches.load(Ordering::SeqCst), 1);
}
