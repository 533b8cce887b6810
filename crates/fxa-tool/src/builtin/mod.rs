//! Built-in tools

pub mod exchange_rate;

pub use exchange_rate::{ExchangeRateArgs, ExchangeRateResult, ExchangeRateTool, LookupError};
