use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};
use tracing::{info, warn};

use common::format::usd;
use common::TradingConfig;
use engine::{MonitorHandle, MonitorStatus, RemoteAnalyzer};
use strategy::{EvaluationOutcome, MarketSummary};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Dependencies injected into every handler via `dptree`.
#[derive(Clone)]
pub struct BotDeps {
    pub monitor: MonitorHandle,
    pub remote: Option<Arc<RemoteAnalyzer>>,
    /// Only this chat is served.
    pub chat_id: i64,
}

/// Operator commands. Single-letter forms are hidden aliases.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Signal monitor commands:")]
pub enum Command {
    #[command(description = "Market analysis for the monitored symbol")]
    Analysis,
    #[command(description = "Show the active trade setup")]
    Setup,
    #[command(description = "Show monitor status and last signal")]
    Status,
    #[command(description = "Show the current price")]
    Price,
    #[command(description = "List commands")]
    Help,
    #[command(description = "off")]
    A,
    #[command(description = "off")]
    S,
    #[command(description = "off")]
    St,
    #[command(description = "off")]
    P,
    #[command(description = "off")]
    H,
}

/// Start the command bot in long-polling mode.
pub async fn start_bot(bot: Bot, deps: BotDeps) {
    let deps = Arc::new(deps);

    info!(chat_id = deps.chat_id, "Telegram command bot starting (long-polling)");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Analysis].endpoint(handle_analysis))
        .branch(case![Command::A].endpoint(handle_analysis))
        .branch(case![Command::Setup].endpoint(handle_setup))
        .branch(case![Command::S].endpoint(handle_setup))
        .branch(case![Command::Status].endpoint(handle_status))
        .branch(case![Command::St].endpoint(handle_status))
        .branch(case![Command::Price].endpoint(handle_price))
        .branch(case![Command::P].endpoint(handle_price))
        .branch(case![Command::Help].endpoint(handle_help))
        .branch(case![Command::H].endpoint(handle_help));

    Update::filter_message()
        .filter_async(auth_filter)
        .branch(command_handler)
}

/// Silently drop messages from any other chat.
async fn auth_filter(msg: Message, deps: Arc<BotDeps>) -> bool {
    let allowed = msg.chat.id.0 == deps.chat_id;
    if !allowed {
        warn!(chat_id = msg.chat.id.0, "Command from unauthorized chat ignored");
    }
    allowed
}

async fn handle_analysis(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    bot.send_message(msg.chat.id, "Analysing market\u{2026}").await?;
    let monitor = &deps.monitor;

    if let Some(remote) = &deps.remote {
        match remote
            .analyze(monitor.symbol(), monitor.timeframe(), monitor.candle_limit())
            .await
        {
            Ok(analysis) => {
                bot.send_message(msg.chat.id, analysis.render()).await?;
                return Ok(());
            }
            Err(e) => warn!(error = %e, "Remote analysis failed, using local summary"),
        }
    }

    let text = match monitor.evaluate_now().await {
        Ok(outcome) => local_analysis_text(monitor.symbol(), &outcome, Utc::now()),
        Err(e) => {
            warn!(error = %e, "Failed to fetch candles for /analysis");
            format!("Could not fetch market data: {e}")
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_setup(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let m = &deps.monitor;
    let text = setup_text(
        m.symbol(),
        m.timeframe(),
        m.trading(),
        m.check_interval(),
        m.cooldown(),
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_status(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let status = deps.monitor.status().await;
    bot.send_message(msg.chat.id, status_text(&status, Utc::now()))
        .await?;
    Ok(())
}

async fn handle_price(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let symbol = deps.monitor.symbol();
    let text = match deps.monitor.last_price().await {
        Ok(price) => format!("{symbol}: {}", usd(price, 2)),
        Err(e) => {
            warn!(error = %e, "Failed to fetch price for /price");
            format!("Could not fetch the price of {symbol}: {e}")
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

// ─── Rendering ────────────────────────────────────────────────────────────────

pub fn local_analysis_text(symbol: &str, outcome: &EvaluationOutcome, now: DateTime<Utc>) -> String {
    match outcome {
        EvaluationOutcome::InsufficientData { bars, required } => format!(
            "Not enough market data for {symbol} yet ({bars}/{required} candles)."
        ),
        EvaluationOutcome::Evaluated(evaluation) => {
            MarketSummary::from_evaluation(symbol, evaluation).render(now)
        }
    }
}

pub fn setup_text(
    symbol: &str,
    timeframe: &str,
    trading: &TradingConfig,
    interval: Duration,
    cooldown: Duration,
) -> String {
    let zone = match trading.entry_zone() {
        Some(zone) => format!("{} - {}", usd(zone.min, 0), usd(zone.max, 0)),
        None => "Fibonacci golden zone (derived)".to_string(),
    };
    let optional = |tp: Option<f64>| tp.map(|v| usd(v, 0)).unwrap_or_else(|| "-".to_string());

    format!(
        "ACTIVE SETUP | {symbol} {timeframe}\n\n\
         Entry zone: {zone}\n\
         Stop loss: {stop}\n\
         TP1: {tp1}\n\
         TP2: {tp2}\n\
         TP3: {tp3}\n\n\
         Min conditions: {min_conditions}\n\
         Min confidence: {min_confidence}%\n\
         Check interval: {interval}s\n\
         Cooldown: {cooldown}s",
        stop = usd(trading.stop_loss, 0),
        tp1 = usd(trading.tp1, 0),
        tp2 = optional(trading.tp2),
        tp3 = optional(trading.tp3),
        min_conditions = trading.min_conditions,
        min_confidence = trading.min_confidence,
        interval = interval.as_secs(),
        cooldown = cooldown.as_secs(),
    )
}

pub fn status_text(status: &MonitorStatus, now: DateTime<Utc>) -> String {
    let uptime = now - status.started_at;
    let price = status
        .last_price
        .map(|p| usd(p, 2))
        .unwrap_or_else(|| "-".to_string());
    let evaluation = match &status.last_evaluation {
        Some(e) => format!(
            "{} | {}% confidence | {} conditions{}",
            e.pattern,
            e.confidence,
            e.conditions,
            if e.should_fire { " | firing" } else { "" }
        ),
        None => "-".to_string(),
    };
    let last_signal = status
        .last_signal
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "none yet".to_string());

    format!(
        "MONITOR STATUS | {symbol} {timeframe} ({exchange})\n\n\
         Uptime: {hours}h {minutes}m\n\
         Checks: {checks}\n\
         Last price: {price}\n\
         Last evaluation: {evaluation}\n\
         Signals delivered: {signals}\n\
         Last signal: {last_signal}",
        symbol = status.symbol,
        timeframe = status.timeframe,
        exchange = status.exchange,
        hours = uptime.num_hours(),
        minutes = uptime.num_minutes() % 60,
        checks = status.checks,
        signals = status.signals_delivered,
    )
}
