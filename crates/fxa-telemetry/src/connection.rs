//! Connection value parsing
//!
//! Two forms are accepted:
//! - an Application Insights connection string,
//!   `InstrumentationKey=<guid>;IngestionEndpoint=<url>;...`
//! - an OTLP/HTTP endpoint, any value starting with `http://` or `https://`

use thiserror::Error;
use url::Url;

pub const DEFAULT_INGESTION_ENDPOINT: &str = "https://dc.services.visualstudio.com";

const OTLP_TRACES_PATH: &str = "/v1/traces";

/// Where spans are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    AppInsights {
        instrumentation_key: String,
        ingestion_endpoint: Url,
    },
    Otlp {
        /// Full traces URL, ending in `/v1/traces`
        endpoint: Url,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("InstrumentationKey is missing")]
    MissingInstrumentationKey,

    #[error("segment '{0}' is not a key=value pair")]
    MalformedPair(String),

    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
}

impl ConnectionTarget {
    /// Parse a connection value.
    ///
    /// Blank input means telemetry is not configured and yields `Ok(None)`.
    pub fn parse(value: &str) -> Result<Option<Self>, ConnectionError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::parse_otlp(value).map(Some);
        }

        Self::parse_app_insights(value).map(Some)
    }

    /// Short exporter name, used in logs
    pub fn exporter_name(&self) -> &'static str {
        match self {
            ConnectionTarget::AppInsights { .. } => "appinsights",
            ConnectionTarget::Otlp { .. } => "otlp",
        }
    }

    fn parse_otlp(value: &str) -> Result<Self, ConnectionError> {
        let mut endpoint = parse_url(value)?;
        if !endpoint.path().ends_with(OTLP_TRACES_PATH) {
            let path = format!("{}{}", endpoint.path().trim_end_matches('/'), OTLP_TRACES_PATH);
            endpoint.set_path(&path);
        }
        Ok(ConnectionTarget::Otlp { endpoint })
    }

    fn parse_app_insights(value: &str) -> Result<Self, ConnectionError> {
        let mut instrumentation_key = None;
        let mut ingestion_endpoint = None;

        for segment in value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, val) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionError::MalformedPair(segment.to_string()))?;
            let (key, val) = (key.trim(), val.trim());
            if key.is_empty() {
                return Err(ConnectionError::MalformedPair(segment.to_string()));
            }

            match key.to_ascii_lowercase().as_str() {
                "instrumentationkey" => instrumentation_key = Some(val.to_string()),
                "ingestionendpoint" => ingestion_endpoint = Some(parse_url(val)?),
                // LiveEndpoint, ApplicationId, EndpointSuffix...
                _ => {}
            }
        }

        let instrumentation_key = instrumentation_key
            .filter(|key| !key.is_empty())
            .ok_or(ConnectionError::MissingInstrumentationKey)?;
        let ingestion_endpoint = match ingestion_endpoint {
            Some(url) => url,
            None => parse_url(DEFAULT_INGESTION_ENDPOINT)?,
        };

        Ok(ConnectionTarget::AppInsights {
            instrumentation_key,
            ingestion_endpoint,
        })
    }
}

fn parse_url(value: &str) -> Result<Url, ConnectionError> {
    Url::parse(value).map_err(|e| ConnectionError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_not_configured() {
        assert_eq!(ConnectionTarget::parse(""), Ok(None));
        assert_eq!(ConnectionTarget::parse("  \t "), Ok(None));
    }

    #[test]
    fn test_full_connection_string() {
        let target = ConnectionTarget::parse(
            "InstrumentationKey=00000000-0000-0000-0000-000000000000;\
             IngestionEndpoint=https://westeurope-5.in.applicationinsights.azure.com/;\
             LiveEndpoint=https://westeurope.livediagnostics.monitor.azure.com/",
        )
        .unwrap()
        .unwrap();

        match target {
            ConnectionTarget::AppInsights {
                instrumentation_key,
                ingestion_endpoint,
            } => {
                assert_eq!(instrumentation_key, "00000000-0000-0000-0000-000000000000");
                assert_eq!(
                    ingestion_endpoint.as_str(),
                    "https://westeurope-5.in.applicationinsights.azure.com/"
                );
            }
            other => panic!("unexpected target: {:?}", other),
        }
    }

    #[test]
    fn test_keys_are_case_insensitive_and_endpoint_defaults() {
        let target = ConnectionTarget::parse("instrumentationkey=abc;").unwrap().unwrap();
        assert_eq!(
            target,
            ConnectionTarget::AppInsights {
                instrumentation_key: "abc".to_string(),
                ingestion_endpoint: Url::parse(DEFAULT_INGESTION_ENDPOINT).unwrap(),
            }
        );
        assert_eq!(target.exporter_name(), "appinsights");
    }

    #[test]
    fn test_missing_instrumentation_key() {
        let err = ConnectionTarget::parse("IngestionEndpoint=https://example.com/").unwrap_err();
        assert_eq!(err, ConnectionError::MissingInstrumentationKey);

        let err = ConnectionTarget::parse("InstrumentationKey=;").unwrap_err();
        assert_eq!(err, ConnectionError::MissingInstrumentationKey);
    }

    #[test]
    fn test_malformed_pair() {
        let err = ConnectionTarget::parse("InstrumentationKey=abc;garbage").unwrap_err();
        assert_eq!(err, ConnectionError::MalformedPair("garbage".to_string()));

        assert!(ConnectionTarget::parse("not a connection string").is_err());
        assert!(ConnectionTarget::parse("=value").is_err());
    }

    #[test]
    fn test_invalid_ingestion_endpoint() {
        let err =
            ConnectionTarget::parse("InstrumentationKey=abc;IngestionEndpoint=not-a-url").unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidUrl { .. }));
    }

    #[test]
    fn test_otlp_endpoint_gets_traces_path() {
        let target = ConnectionTarget::parse("http://localhost:4318").unwrap().unwrap();
        assert_eq!(
            target,
            ConnectionTarget::Otlp {
                endpoint: Url::parse("http://localhost:4318/v1/traces").unwrap()
            }
        );

        let target = ConnectionTarget::parse("https://collector.example.com/otlp/v1/traces")
            .unwrap()
            .unwrap();
        match target {
            ConnectionTarget::Otlp { endpoint } => {
                assert_eq!(endpoint.as_str(), "https://collector.example.com/otlp/v1/traces")
            }
            other => panic!("unexpected target: {:?}", other),
        }
    }
}
