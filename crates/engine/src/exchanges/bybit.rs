use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use common::{Candle, CandleSeries, Error, MarketDataSource, Result};

use super::{get_text, http_client, number, timestamp};

const BASE_URL: &str = "https://api.bybit.com";

/// Bybit v5 linear (USDT perpetual) market data.
pub struct BybitClient {
    base_url: String,
    http: Client,
}

impl BybitClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: http_client(),
        }
    }
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

pub fn map_symbol(symbol: &str) -> &str {
    match symbol {
        "BTCUSD-PERP" => "BTCUSDT",
        "ETHUSD-PERP" => "ETHUSDT",
        other => other,
    }
}

/// Bybit intervals are minutes, or `D`/`W`.
pub fn map_timeframe(timeframe: &str) -> &str {
    match timeframe {
        "1m" => "1",
        "5m" => "5",
        "15m" => "15",
        "30m" => "30",
        "1h" => "60",
        "4h" => "240",
        "1d" | "1D" => "D",
        "1w" | "1W" => "W",
        other => other,
    }
}

/// `result.list` comes newest first; `CandleSeries` re-sorts it.
pub fn parse_klines(body: &str, limit: usize) -> Result<CandleSeries> {
    let envelope: Envelope<KlineResult> = serde_json::from_str(body)?;
    let result = envelope.into_result()?;
    let candles = result
        .list
        .iter()
        .filter_map(|row| {
            Some(Candle {
                timestamp: timestamp(row.first()?)?,
                open: number(row.get(1)?)?,
                high: number(row.get(2)?)?,
                low: number(row.get(3)?)?,
                close: number(row.get(4)?)?,
                volume: number(row.get(5)?)?,
            })
        })
        .collect();
    Ok(CandleSeries::from_candles(candles, limit))
}

pub fn parse_ticker(body: &str) -> Result<f64> {
    let envelope: Envelope<TickerResult> = serde_json::from_str(body)?;
    envelope
        .into_result()?
        .list
        .first()
        .and_then(|t| t.last_price.parse::<f64>().ok())
        .ok_or_else(|| Error::Exchange("Bybit ticker response had no price".into()))
}

#[async_trait]
impl MarketDataSource for BybitClient {
    fn name(&self) -> &str {
        "bybit"
    }

    async fn candles(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<CandleSeries> {
        let pair = map_symbol(symbol);
        let url = format!("{}/v5/market/kline", self.base_url);
        let query = [
            ("category", "linear".to_string()),
            ("symbol", pair.to_string()),
            ("interval", map_timeframe(timeframe).to_string()),
            ("limit", limit.to_string()),
        ];

        let body = get_text(&self.http, &url, &query).await?;
        let series = parse_klines(&body, limit)?;
        debug!(pair = %pair, candles = series.len(), "Fetched klines from Bybit");
        Ok(series)
    }

    async fn last_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/v5/market/tickers", self.base_url);
        let query = [
            ("category", "linear".to_string()),
            ("symbol", map_symbol(symbol).to_string()),
        ];
        let body = get_text(&self.http, &url, &query).await?;
        parse_ticker(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T> {
        if self.ret_code != 0 {
            return Err(Error::Exchange(format!(
                "Bybit retCode {}: {}",
                self.ret_code, self.ret_msg
            )));
        }
        self.result
            .ok_or_else(|| Error::Exchange("Bybit response had no result".into()))
    }
}

#[derive(Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct TickerResult {
    #[serde(default)]
    list: Vec<Ticker>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    last_price: String,
}
