//! Public REST market-data clients.

pub mod binance;
pub mod bybit;
pub mod cryptocom;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;

use common::{Error, MarketDataSource, Result};

pub use binance::BinanceClient;
pub use bybit::BybitClient;
pub use cryptocom::CryptoComClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    Binance,
    Bybit,
    CryptoCom,
}

impl ExchangeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExchangeKind::Binance => "binance",
            ExchangeKind::Bybit => "bybit",
            ExchangeKind::CryptoCom => "cryptocom",
        }
    }

    /// Build the client for this exchange against its public endpoint.
    pub fn connect(&self) -> Arc<dyn MarketDataSource> {
        match self {
            ExchangeKind::Binance => Arc::new(BinanceClient::new()),
            ExchangeKind::Bybit => Arc::new(BybitClient::new()),
            ExchangeKind::CryptoCom => Arc::new(CryptoComClient::new()),
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExchangeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binance" => Ok(ExchangeKind::Binance),
            "bybit" => Ok(ExchangeKind::Bybit),
            "cryptocom" | "crypto.com" => Ok(ExchangeKind::CryptoCom),
            other => Err(Error::Config(format!(
                "unsupported exchange '{other}' (options: binance, bybit, cryptocom, crypto.com)"
            ))),
        }
    }
}

// ─── Shared HTTP helpers ──────────────────────────────────────────────────────

pub(crate) fn http_client() -> Client {
    Client::builder()
        .use_rustls_tls()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// GET `url` and return the body; non-2xx statuses become `Error::Exchange`.
pub(crate) async fn get_text(http: &Client, url: &str, query: &[(&str, String)]) -> Result<String> {
    let resp = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

    if !status.is_success() {
        let snippet: String = body.chars().take(200).collect();
        return Err(Error::Exchange(format!("HTTP {status}: {snippet}")));
    }
    Ok(body)
}

/// Exchanges send prices both as JSON numbers and as decimal strings.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Epoch milliseconds (number or string) or an RFC 3339 string.
pub(crate) fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => match s.parse::<i64>() {
            Ok(ms) => Utc.timestamp_millis_opt(ms).single(),
            Err(_) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        },
        _ => None,
    }
}
