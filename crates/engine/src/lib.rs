pub mod exchanges;
pub mod monitor;
pub mod remote;

pub use exchanges::{BinanceClient, BybitClient, CryptoComClient, ExchangeKind};
pub use monitor::{EvaluationSummary, Monitor, MonitorHandle, MonitorStatus, TickOutcome};
pub use remote::{MarketAnalysis, RemoteAnalyzer};
