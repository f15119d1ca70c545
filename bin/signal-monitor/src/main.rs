use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use engine::{ExchangeKind, Monitor, RemoteAnalyzer};
use notify::NotifierSet;
use strategy::{resolve_preset, PresetFile, SignalDetector};
use telegram_ctrl::{start_bot, BotDeps};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let exchange: ExchangeKind = cfg
        .exchange
        .parse()
        .unwrap_or_else(|e| panic!("Invalid EXCHANGE: {e}"));

    let trading = match &cfg.trading_preset {
        Some(name) => {
            let file = cfg.presets_file.as_deref().map(PresetFile::load);
            let trading = resolve_preset(name, file.as_ref())
                .unwrap_or_else(|e| panic!("Invalid TRADING_PRESET: {e}"));
            info!(preset = %name, "Using trading preset");
            trading
        }
        None => cfg.trading.clone(),
    };

    info!(
        symbol = %cfg.symbol,
        timeframe = %cfg.timeframe,
        exchange = %exchange,
        stop_loss = trading.stop_loss,
        tp1 = trading.tp1,
        min_conditions = trading.min_conditions,
        min_confidence = trading.min_confidence,
        "Signal monitor starting"
    );

    // ── Market data & notifiers ───────────────────────────────────────────────
    let source = exchange.connect();
    let notifiers = NotifierSet::from_config(&cfg);

    // ── Monitor ───────────────────────────────────────────────────────────────
    let detector = SignalDetector::new(cfg.symbol.clone(), cfg.timeframe.clone(), trading);
    let (monitor, handle) = Monitor::new(
        detector,
        source,
        notifiers,
        cfg.candle_limit,
        Duration::from_secs(cfg.check_interval_secs.max(1)),
        cfg.signal_cooldown_secs,
    );

    // ── Telegram commands ─────────────────────────────────────────────────────
    let sinks = &cfg.notifications;
    match (&sinks.telegram_token, sinks.telegram_chat_id) {
        (Some(token), Some(chat_id)) if cfg.telegram_commands_enabled => {
            let deps = BotDeps {
                monitor: handle.clone(),
                remote: cfg.analysis_api.as_ref().map(|api| Arc::new(RemoteAnalyzer::new(api))),
                chat_id,
            };
            tokio::spawn(start_bot(teloxide::Bot::new(token.clone()), deps));
        }
        _ if cfg.telegram_commands_enabled => {
            warn!("TELEGRAM_TOKEN or TELEGRAM_CHAT_ID missing; command bot disabled");
        }
        _ => info!("Telegram command bot disabled"),
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    tokio::spawn(monitor.run());

    info!("Monitor running. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    let status = handle.status().await;
    info!(
        checks = status.checks,
        signals = status.signals_delivered,
        "Shutdown signal received. Exiting."
    );
}
