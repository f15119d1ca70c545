use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use common::{Candle, CandleSeries, Error, MarketDataSource, Result};

use super::{get_text, http_client, number, timestamp};

const BASE_URL: &str = "https://api.binance.com";

/// Binance spot public API. No credentials needed for klines and tickers.
pub struct BinanceClient {
    base_url: String,
    http: Client,
}

impl BinanceClient {
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

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Perpetual-style names map onto the spot USDT pairs.
pub fn map_symbol(symbol: &str) -> &str {
    match symbol {
        "BTCUSD-PERP" => "BTCUSDT",
        "ETHUSD-PERP" => "ETHUSDT",
        other => other,
    }
}

pub fn map_timeframe(timeframe: &str) -> &str {
    match timeframe {
        "1D" => "1d",
        other => other,
    }
}

/// Klines are positional arrays: `[open_time, open, high, low, close, volume, ...]`
/// with prices as strings.
pub fn parse_klines(body: &str, limit: usize) -> Result<CandleSeries> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    let candles = rows
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
    let ticker: PriceTicker = serde_json::from_str(body)?;
    ticker
        .price
        .parse::<f64>()
        .map_err(|e| Error::Exchange(e.to_string()))
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    async fn candles(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<CandleSeries> {
        let pair = map_symbol(symbol);
        let url = format!("{}/api/v3/klines", self.base_url);
        let query = [
            ("symbol", pair.to_string()),
            ("interval", map_timeframe(timeframe).to_string()),
            ("limit", limit.to_string()),
        ];

        let body = get_text(&self.http, &url, &query).await?;
        let series = parse_klines(&body, limit)?;
        debug!(pair = %pair, candles = series.len(), "Fetched klines from Binance");
        Ok(series)
    }

    async fn last_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let query = [("symbol", map_symbol(symbol).to_string())];
        let body = get_text(&self.http, &url, &query).await?;
        parse_ticker(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PriceTicker {
    price: String,
}
