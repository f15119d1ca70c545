use crate::TradingConfig;

/// All configuration loaded from environment variables at startup.
/// Malformed values cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Instrument
    pub symbol: String,
    pub timeframe: String,
    pub exchange: String,
    pub candle_limit: usize,

    // Polling
    pub check_interval_secs: u64,
    pub signal_cooldown_secs: u64,

    // Trade setup
    pub trading: TradingConfig,
    pub trading_preset: Option<String>,
    pub presets_file: Option<String>,

    // Notification sinks
    pub notifications: NotificationConfig,

    // Telegram command bot
    pub telegram_commands_enabled: bool,

    // Remote analysis service
    pub analysis_api: Option<AnalysisApiConfig>,
}

/// Sinks are enabled by presence: an unset URL or token disables that channel.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub n8n_webhook: Option<String>,
    pub discord_webhook: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AnalysisApiConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = TradingConfig::default();

        let trading = TradingConfig {
            entry_zone_min: Some(parse_or(&get, "ENTRY_ZONE_MIN", 94_200.0)),
            entry_zone_max: Some(parse_or(&get, "ENTRY_ZONE_MAX", 94_500.0)),
            stop_loss: parse_or(&get, "STOP_LOSS", defaults.stop_loss),
            tp1: parse_or(&get, "TP1", defaults.tp1),
            tp2: optional_price(&lookup, "TP2", defaults.tp2),
            tp3: optional_price(&lookup, "TP3", defaults.tp3),
            min_conditions: parse_or(&get, "MIN_CONDITIONS", defaults.min_conditions),
            min_confidence: parse_or(&get, "MIN_CONFIDENCE", defaults.min_confidence),
        };

        let notifications = NotificationConfig {
            webhook_url: get("WEBHOOK_URL"),
            n8n_webhook: get("N8N_WEBHOOK"),
            discord_webhook: get("DISCORD_WEBHOOK"),
            telegram_token: get("TELEGRAM_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID").map(|v| {
                v.trim().parse::<i64>().unwrap_or_else(|_| {
                    panic!("TELEGRAM_CHAT_ID must be a numeric chat id, got: '{v}'")
                })
            }),
        };

        let analysis_api = match (get("ANALYSIS_API_URL"), get("ANALYSIS_API_KEY")) {
            (Some(base_url), Some(api_key)) => Some(AnalysisApiConfig { base_url, api_key }),
            _ => None,
        };

        Config {
            symbol: get("SYMBOL").unwrap_or_else(|| "BTCUSD-PERP".to_string()),
            timeframe: get("TIMEFRAME").unwrap_or_else(|| "1h".to_string()),
            exchange: get("EXCHANGE").unwrap_or_else(|| "cryptocom".to_string()),
            candle_limit: parse_or(&get, "CANDLE_LIMIT", 100),
            check_interval_secs: parse_or(&get, "CHECK_INTERVAL", 60),
            signal_cooldown_secs: parse_or(&get, "SIGNAL_COOLDOWN", 3600),
            trading,
            trading_preset: get("TRADING_PRESET"),
            presets_file: get("PRESETS_FILE"),
            notifications,
            telegram_commands_enabled: get("TELEGRAM_COMMANDS_ENABLED")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            analysis_api,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            panic!("Environment variable '{key}' has an invalid value: '{raw}'")
        }),
        None => default,
    }
}

/// `none` or an empty value disables an optional take-profit; unset keeps
/// the default. Reads the raw lookup so `TP3=` is seen as set.
fn optional_price<G>(lookup: &G, key: &str, default: Option<f64>) -> Option<f64>
where
    G: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("none") => None,
        Some(_) => Some(parse_or(lookup, key, 0.0)),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_setup() {
        let cfg = load(&[]);
        assert_eq!(cfg.symbol, "BTCUSD-PERP");
        assert_eq!(cfg.exchange, "cryptocom");
        assert_eq!(cfg.timeframe, "1h");
        assert_eq!(cfg.check_interval_secs, 60);
        assert_eq!(cfg.signal_cooldown_secs, 3600);
        assert_eq!(cfg.trading, TradingConfig::default());
        assert!(cfg.telegram_commands_enabled);
        assert!(cfg.analysis_api.is_none());
        assert!(cfg.notifications.webhook_url.is_none());
    }

    #[test]
    fn overrides_and_disabled_targets() {
        let cfg = load(&[
            ("SYMBOL", "ETHUSDT"),
            ("STOP_LOSS", "3000.5"),
            ("TP2", "none"),
            ("TP3", ""),
            ("MIN_CONFIDENCE", "75"),
            ("TELEGRAM_CHAT_ID", "-100123"),
            ("TELEGRAM_COMMANDS_ENABLED", "false"),
        ]);
        assert_eq!(cfg.symbol, "ETHUSDT");
        assert_eq!(cfg.trading.stop_loss, 3000.5);
        assert_eq!(cfg.trading.tp2, None);
        assert_eq!(cfg.trading.tp3, None);
        assert_eq!(cfg.trading.min_confidence, 75);
        assert_eq!(cfg.notifications.telegram_chat_id, Some(-100123));
        assert!(!cfg.telegram_commands_enabled);
    }

    #[test]
    fn blank_take_profit_disables_it() {
        let cfg = load(&[("TP2", "  "), ("TP3", "")]);
        assert_eq!(cfg.trading.tp2, None);
        assert_eq!(cfg.trading.tp3, None);
        assert_eq!(cfg.trading.tp1, TradingConfig::default().tp1);

        let unset = load(&[]);
        assert_eq!(unset.trading.tp3, Some(98_500.0));
    }

    #[test]
    #[should_panic(expected = "MIN_CONDITIONS")]
    fn invalid_number_panics() {
        load(&[("MIN_CONDITIONS", "four")]);
    }
}
