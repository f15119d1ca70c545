pub mod config;
pub mod error;
pub mod exchange;
pub mod format;
pub mod notifier;
pub mod trading;
pub mod types;

pub use config::{AnalysisApiConfig, Config, NotificationConfig};
pub use error::{Error, Result};
pub use exchange::MarketDataSource;
pub use notifier::Notifier;
pub use trading::TradingConfig;
pub use types::*;
