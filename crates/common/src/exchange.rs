use async_trait::async_trait;

use crate::{CandleSeries, Result};

/// Abstraction over a market-data provider.
///
/// Each exchange resolves its own symbol aliases, interval names and
/// response field names; callers only ever see a normalized `CandleSeries`
/// (sorted, deduplicated, most recent last).
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Short identifier used in logs (e.g. "binance").
    fn name(&self) -> &str;

    /// Fetch up to `limit` recent candles for `symbol` on `timeframe`.
    async fn candles(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<CandleSeries>;

    /// Get the latest traded price for `symbol`.
    async fn last_price(&self, symbol: &str) -> Result<f64>;
}
