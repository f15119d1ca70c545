use async_trait::async_trait;

use crate::{Result, TradingSignal};

/// A single delivery channel for fired signals.
///
/// Implementations report failure as `Err`; they never panic and never
/// retry. The fan-out in `notify::NotifierSet` decides what a failure means.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs (e.g. "telegram").
    fn name(&self) -> &str;

    /// Deliver one signal.
    async fn deliver(&self, signal: &TradingSignal) -> Result<()>;
}
