//! `get_exchange_rate`: currency rate lookup against the Frankfurter API
//!
//! Lookup failures never fail the tool call. The model receives an object with
//! an `error` field instead and can explain the problem to the user.

use crate::ToolSchema;
use async_trait::async_trait;
use chrono::NaiveDate;
use fxa_core::{Error, ExchangeConfig, Result, Tool, ToolContext, ToolResponse};
use fxa_telemetry::attributes::{FX_CURRENCY_BASE, FX_CURRENCY_TARGET};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

pub const TOOL_NAME: &str = "get_exchange_rate";

const LATEST: &str = "latest";

/// Arguments as sent by the model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeRateArgs {
    #[serde(default = "default_currency_from", alias = "base_currency")]
    pub currency_from: String,

    #[serde(default = "default_currency_to", alias = "target_currency")]
    pub currency_to: String,

    #[serde(default = "default_currency_date")]
    pub currency_date: String,
}

fn default_currency_from() -> String {
    "USD".to_string()
}

fn default_currency_to() -> String {
    "EUR".to_string()
}

fn default_currency_date() -> String {
    LATEST.to_string()
}

impl ExchangeRateArgs {
    /// Parse model arguments; `null` means "all defaults"
    pub fn from_value(params: &Value) -> std::result::Result<Self, LookupError> {
        let params = match params {
            Value::Null => json!({}),
            other => other.clone(),
        };
        let args: Self = serde_json::from_value(params)
            .map_err(|e| LookupError::InvalidArgument(format!("invalid arguments: {}", e)))?;
        Ok(args.normalized())
    }

    fn normalized(self) -> Self {
        let date = self.currency_date.trim();
        Self {
            currency_from: self.currency_from.trim().to_ascii_uppercase(),
            currency_to: self.currency_to.trim().to_ascii_uppercase(),
            currency_date: if date.is_empty() || date.eq_ignore_ascii_case(LATEST) {
                LATEST.to_string()
            } else {
                date.to_string()
            },
        }
    }

    /// Check currency codes and date format
    pub fn validate(&self) -> std::result::Result<(), LookupError> {
        for code in [&self.currency_from, &self.currency_to] {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(LookupError::InvalidArgument(format!(
                    "'{}' is not a three-letter currency code",
                    code
                )));
            }
        }
        if self.currency_date != LATEST
            && NaiveDate::parse_from_str(&self.currency_date, "%Y-%m-%d").is_err()
        {
            return Err(LookupError::InvalidArgument(format!(
                "'{}' is not a date in YYYY-MM-DD format or 'latest'",
                self.currency_date
            )));
        }
        Ok(())
    }
}

/// A successful lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRateResult {
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub date: String,
}

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("exchange rate service did not respond within {0:?}")]
    Timeout(Duration),

    #[error("exchange rate service returned HTTP {0}")]
    Status(u16),

    #[error("exchange rate service unreachable: {0}")]
    Transport(String),

    #[error("unexpected response from exchange rate service: {0}")]
    Malformed(String),

    #[error("{0}")]
    InvalidArgument(String),
}

impl LookupError {
    /// Transport failures, timeouts and 5xx responses are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Timeout(_) | LookupError::Transport(_) => true,
            LookupError::Status(code) => *code >= 500,
            LookupError::Malformed(_) | LookupError::InvalidArgument(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    base: String,
    date: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Exchange-rate lookup tool
#[derive(Debug, Clone)]
pub struct ExchangeRateTool {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl ExchangeRateTool {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_attempts: u32,
        retry_backoff: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config_error(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            max_attempts: max_attempts.max(1),
            retry_backoff,
        })
    }

    pub fn from_config(config: &ExchangeConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Look up one rate, retrying transient failures
    pub async fn lookup(
        &self,
        args: &ExchangeRateArgs,
    ) -> std::result::Result<ExchangeRateResult, LookupError> {
        args.validate()?;

        let mut attempt = 1;
        loop {
            match self.fetch(args).await {
                Ok(result) => return Ok(result),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.retry_backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying exchange rate lookup"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch(
        &self,
        args: &ExchangeRateArgs,
    ) -> std::result::Result<ExchangeRateResult, LookupError> {
        let url = format!("{}/{}", self.base_url, args.currency_date);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("base", args.currency_from.as_str()),
                ("symbols", args.currency_to.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: FrankfurterResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.timeout)
            } else {
                LookupError::Malformed(e.to_string())
            }
        })?;

        let rate = body.rates.get(&args.currency_to).copied().ok_or_else(|| {
            LookupError::Malformed(format!("no rate for {} in response", args.currency_to))
        })?;

        Ok(ExchangeRateResult {
            base: body.base,
            target: args.currency_to.clone(),
            rate,
            date: body.date,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.timeout)
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Tool for ExchangeRateTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get the exchange rate between two currencies on a given date. \
         Use it whenever the user asks to convert an amount or for a rate."
    }

    fn schema(&self) -> Value {
        ToolSchema::new()
            .property_with_default(
                "currency_from",
                "string",
                "ISO 4217 code of the currency to convert from, e.g. USD",
                "USD",
            )
            .property_with_default(
                "currency_to",
                "string",
                "ISO 4217 code of the currency to convert to, e.g. EUR",
                "EUR",
            )
            .property_with_default(
                "currency_date",
                "string",
                "Date of the rate as YYYY-MM-DD, or 'latest'",
                LATEST,
            )
            .build()
    }

    fn trace_attributes(&self, params: &Value) -> Vec<(&'static str, String)> {
        match ExchangeRateArgs::from_value(params) {
            Ok(args) => vec![
                (FX_CURRENCY_BASE, args.currency_from),
                (FX_CURRENCY_TARGET, args.currency_to),
            ],
            Err(_) => Vec::new(),
        }
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, params: Value) -> Result<ToolResponse> {
        let args = match ExchangeRateArgs::from_value(&params) {
            Ok(args) => args,
            Err(err) => {
                tracing::warn!(
                    invocation_id = %ctx.invocation_id(),
                    tool_call_id = %ctx.function_call_id(),
                    error = %err,
                    "Rejected exchange rate arguments"
                );
                return Ok(ToolResponse {
                    result: json!({ "error": err.to_string() }),
                });
            }
        };

        let result = match self.lookup(&args).await {
            Ok(rate) => {
                tracing::info!(
                    invocation_id = %ctx.invocation_id(),
                    tool_call_id = %ctx.function_call_id(),
                    base = %rate.base,
                    target = %rate.target,
                    rate = rate.rate,
                    date = %rate.date,
                    "Exchange rate lookup succeeded"
                );
                serde_json::to_value(&rate)?
            }
            Err(err) => {
                tracing::warn!(
                    invocation_id = %ctx.invocation_id(),
                    tool_call_id = %ctx.function_call_id(),
                    base = %args.currency_from,
                    target = %args.currency_to,
                    error = %err,
                    "Exchange rate lookup failed"
                );
                json!({
                    "error": err.to_string(),
                    "base": args.currency_from,
                    "target": args.currency_to,
                })
            }
        };

        Ok(ToolResponse { result })
    }
}
