//! HTTP surface of the currency-exchange agent

pub mod error;
pub mod rest;
pub mod types;

pub use error::AppError;
pub use rest::{AppState, INVOCATION_ID_HEADER, MAX_PROMPT_CHARS, create_router, serve, shutdown_signal};
pub use types::*;
