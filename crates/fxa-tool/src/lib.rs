//! Tool system for the currency-exchange agent
//!
//! This crate provides:
//! - A JSON schema builder for tool parameters
//! - The default tool context
//! - Built-in tools (`get_exchange_rate`)

pub mod builtin;
pub mod context;
pub mod schema;

// Re-exports
pub use builtin::{ExchangeRateArgs, ExchangeRateResult, ExchangeRateTool, LookupError};
pub use context::DefaultToolContext;
pub use schema::ToolSchema;

// Re-export core types
pub use fxa_core::{Result, Tool, ToolContext, ToolResponse};
