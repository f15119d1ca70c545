//! Stateless indicator functions over closing prices or candles.

pub mod atr;
pub mod fibonacci;
pub mod moving_average;
pub mod rsi;

pub use atr::{atr, true_range, DEFAULT_ATR_PERIOD};
pub use fibonacci::{fibonacci_levels, recent_swing, FibonacciLevels, FIB_RATIOS};
pub use moving_average::{ema, sma};
pub use rsi::{rsi, DEFAULT_RSI_PERIOD};
