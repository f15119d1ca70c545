use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use common::{Candle, CandleSeries, Error, MarketDataSource, Result};

use super::{get_text, http_client, number, timestamp};

const BASE_URL: &str = "https://api.crypto.com/exchange/v1";

/// Largest page `get-candlestick` serves; without `count` it returns 25.
const MAX_COUNT: usize = 300;

/// Crypto.com Exchange public API. Instrument names are used as-is
/// (`BTCUSD-PERP` is native here).
pub struct CryptoComClient {
    base_url: String,
    http: Client,
}

impl CryptoComClient {
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

impl Default for CryptoComClient {
    fn default() -> Self {
        Self::new()
    }
}

pub fn map_timeframe(timeframe: &str) -> &str {
    match timeframe {
        "1d" => "1D",
        "1w" => "1W",
        other => other,
    }
}

/// First present key wins, so both `close` and `c` spellings parse.
fn field<'a>(item: &'a Map<String, Value>, long: &str, short: &str) -> Option<&'a Value> {
    item.get(long).or_else(|| item.get(short))
}

/// Candles are objects with either long (`open`) or short (`o`) keys and a
/// timestamp in epoch ms or ISO form. Missing volume counts as zero.
pub fn parse_candlesticks(body: &str, limit: usize) -> Result<CandleSeries> {
    let response: Response = serde_json::from_str(body)?;
    let candles = response
        .result
        .data
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            Some(Candle {
                timestamp: timestamp(field(item, "timestamp", "t")?)?,
                open: number(field(item, "open", "o")?)?,
                high: number(field(item, "high", "h")?)?,
                low: number(field(item, "low", "l")?)?,
                close: number(field(item, "close", "c")?)?,
                volume: field(item, "volume", "v").and_then(number).unwrap_or(0.0),
            })
        })
        .collect();
    Ok(CandleSeries::from_candles(candles, limit))
}

/// Ticker `a` is the latest trade price.
pub fn parse_ticker(body: &str) -> Result<f64> {
    let response: Response = serde_json::from_str(body)?;
    response
        .result
        .data
        .first()
        .and_then(|t| t.get("a"))
        .and_then(number)
        .ok_or_else(|| Error::Exchange("Crypto.com ticker response had no price".into()))
}

#[async_trait]
impl MarketDataSource for CryptoComClient {
    fn name(&self) -> &str {
        "cryptocom"
    }

    async fn candles(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<CandleSeries> {
        let url = format!("{}/public/get-candlestick", self.base_url);
        let query = [
            ("instrument_name", symbol.to_string()),
            ("timeframe", map_timeframe(timeframe).to_string()),
            ("count", limit.min(MAX_COUNT).to_string()),
        ];

        let body = get_text(&self.http, &url, &query).await?;
        let series = parse_candlesticks(&body, limit)?;
        debug!(instrument = %symbol, candles = series.len(), "Fetched candles from Crypto.com");
        Ok(series)
    }

    async fn last_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/public/get-ticker", self.base_url);
        let query = [("instrument_name", symbol.to_string())];
        let body = get_text(&self.http, &url, &query).await?;
        parse_ticker(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: ResultData,
}

#[derive(Deserialize, Default)]
struct ResultData {
    #[serde(default)]
    data: Vec<Value>,
}
