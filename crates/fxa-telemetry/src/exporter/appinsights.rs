//! Application Insights exporter
//!
//! Converts finished spans to the ingestion ("Breeze") envelope format and
//! posts them to `{IngestionEndpoint}/v2.1/track`. Server and consumer spans
//! become requests; everything else becomes a dependency.

use crate::TelemetryError;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::BoxFuture;
use opentelemetry::trace::{SpanId, SpanKind, Status, TraceError};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exporter posting spans to an Application Insights ingestion endpoint
#[derive(Debug, Clone)]
pub struct AppInsightsExporter {
    client: reqwest::Client,
    track_url: String,
    instrumentation_key: String,
    role_name: String,
}

impl AppInsightsExporter {
    pub fn new(
        instrumentation_key: String,
        ingestion_endpoint: &Url,
        role_name: String,
    ) -> Result<Self, TelemetryError> {
        let client = reqwest::Client::builder()
            .timeout(EXPORT_TIMEOUT)
            .build()
            .map_err(|e| TelemetryError::ExporterBuild {
                exporter: "appinsights",
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            track_url: format!(
                "{}/v2.1/track",
                ingestion_endpoint.as_str().trim_end_matches('/')
            ),
            instrumentation_key,
            role_name,
        })
    }

    pub fn track_url(&self) -> &str {
        &self.track_url
    }

    fn envelope(&self, span: &SpanData) -> Envelope {
        let duration = span
            .end_time
            .duration_since(span.start_time)
            .unwrap_or_default();
        let success = !matches!(span.status, Status::Error { .. });
        let id = span.span_context.span_id().to_string();
        let name = span.name.to_string();
        let properties: BTreeMap<String, String> = span
            .attributes
            .iter()
            .map(|kv| (kv.key.as_str().to_string(), kv.value.to_string()))
            .collect();

        let mut tags = BTreeMap::new();
        tags.insert("ai.operation.id", span.span_context.trace_id().to_string());
        tags.insert("ai.operation.name", name.clone());
        tags.insert("ai.cloud.role", self.role_name.clone());
        if span.parent_span_id != SpanId::INVALID {
            tags.insert("ai.operation.parentId", span.parent_span_id.to_string());
        }

        let (envelope_name, data) = match span.span_kind {
            SpanKind::Server | SpanKind::Consumer => (
                "Microsoft.ApplicationInsights.Request",
                Data {
                    base_type: "RequestData",
                    base_data: BaseData::Request(RequestData {
                        ver: 2,
                        id,
                        name,
                        duration: format_duration(duration),
                        response_code: status_code(&properties, success),
                        success,
                        properties,
                    }),
                },
            ),
            SpanKind::Client | SpanKind::Producer | SpanKind::Internal => (
                "Microsoft.ApplicationInsights.RemoteDependency",
                Data {
                    base_type: "RemoteDependencyData",
                    base_data: BaseData::Dependency(RemoteDependencyData {
                        ver: 2,
                        id,
                        name,
                        duration: format_duration(duration),
                        result_code: status_code(&properties, success),
                        success,
                        kind: if span.span_kind == SpanKind::Internal {
                            "InProc"
                        } else {
                            "Http"
                        },
                        properties,
                    }),
                },
            ),
        };

        Envelope {
            name: envelope_name,
            time: DateTime::<Utc>::from(span.start_time)
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            i_key: self.instrumentation_key.clone(),
            tags,
            data,
        }
    }
}

impl SpanExporter for AppInsightsExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let envelopes: Vec<Envelope> = batch.iter().map(|span| self.envelope(span)).collect();
        let client = self.client.clone();
        let url = self.track_url.clone();

        Box::pin(async move {
            if envelopes.is_empty() {
                return Ok(());
            }

            let response = client
                .post(&url)
                .json(&envelopes)
                .send()
                .await
                .map_err(|e| TraceError::from(format!("Application Insights export failed: {}", e)))?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(TraceError::from(format!(
                    "Application Insights rejected {} span(s) with status {}",
                    envelopes.len(),
                    status
                )))
            }
        })
    }
}

/// `d.hh:mm:ss.ffffff`
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    format!(
        "{}.{:02}:{:02}:{:02}.{:06}",
        total_secs / 86_400,
        (total_secs % 86_400) / 3_600,
        (total_secs % 3_600) / 60,
        total_secs % 60,
        duration.subsec_micros()
    )
}

fn status_code(properties: &BTreeMap<String, String>, success: bool) -> String {
    properties
        .get("http.response.status_code")
        .or_else(|| properties.get("http.status_code"))
        .cloned()
        .unwrap_or_else(|| if success { "0" } else { "1" }.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    name: &'static str,
    time: String,
    i_key: String,
    tags: BTreeMap<&'static str, String>,
    data: Data,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    base_type: &'static str,
    base_data: BaseData,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BaseData {
    Request(RequestData),
    Dependency(RemoteDependencyData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestData {
    ver: u8,
    id: String,
    name: String,
    duration: String,
    response_code: String,
    success: bool,
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoteDependencyData {
    ver: u8,
    id: String,
    name: String,
    duration: String,
    result_code: String,
    success: bool,
    #[serde(rename = "type")]
    kind: &'static str,
    properties: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingExporter;
    use crate::{AgentIdentity, ActiveTracer, AgentTracer};
    use opentelemetry::KeyValue;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::TracerProvider;
    use serde_json::Value;

    /// Produce real span data for a server span with one internal child
    fn recorded_spans() -> Vec<SpanData> {
        let recorder = RecordingExporter::new();
        let provider = TracerProvider::builder()
            .with_simple_exporter(recorder.clone())
            .build();
        let tracer = ActiveTracer::new(
            provider.tracer("fxa"),
            AgentIdentity {
                agent_name: "fxa-currency-exchange-agent".to_string(),
                agent_id: "fxa-currency-exchange-agent".to_string(),
                provider_name: "fxa".to_string(),
            },
            true,
        );

        let root = tracer.start_span("agent.run", SpanKind::Server, None, vec![]);
        let child = tracer.start_span(
            "execute_tool get_exchange_rate",
            SpanKind::Internal,
            Some(&root),
            vec![KeyValue::new("fx.currency.base", "USD")],
        );
        child.record_error("timeout");
        child.end();
        root.end();

        recorder.spans()
    }

    fn exporter(endpoint: &str) -> AppInsightsExporter {
        AppInsightsExporter::new(
            "ikey-123".to_string(),
            &Url::parse(endpoint).unwrap(),
            "fxa-currency-exchange-agent".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1_500)), "0.00:00:01.500000");
        assert_eq!(
            format_duration(Duration::from_secs(90_061) + Duration::from_micros(7)),
            "1.01:01:01.000007"
        );
    }

    #[test]
    fn test_track_url() {
        assert_eq!(
            exporter("https://westeurope-5.in.applicationinsights.azure.com/").track_url(),
            "https://westeurope-5.in.applicationinsights.azure.com/v2.1/track"
        );
    }

    #[test]
    fn test_envelope_mapping() {
        let spans = recorded_spans();
        let exporter = exporter("https://dc.services.visualstudio.com");

        let child: Value = serde_json::to_value(exporter.envelope(&spans[0])).unwrap();
        let root: Value = serde_json::to_value(exporter.envelope(&spans[1])).unwrap();

        assert_eq!(root["name"], "Microsoft.ApplicationInsights.Request");
        assert_eq!(root["iKey"], "ikey-123");
        assert_eq!(root["data"]["baseType"], "RequestData");
        assert_eq!(root["data"]["baseData"]["success"], true);
        assert!(root["tags"].get("ai.operation.parentId").is_none());

        assert_eq!(child["name"], "Microsoft.ApplicationInsights.RemoteDependency");
        assert_eq!(child["data"]["baseData"]["type"], "InProc");
        assert_eq!(child["data"]["baseData"]["success"], false);
        assert_eq!(child["data"]["baseData"]["properties"]["fx.currency.base"], "USD");
        assert_eq!(child["tags"]["ai.operation.id"], root["tags"]["ai.operation.id"]);
        assert_eq!(child["tags"]["ai.operation.parentId"], root["data"]["baseData"]["id"]);
        assert_eq!(child["tags"]["ai.cloud.role"], "fxa-currency-exchange-agent");
    }

    #[tokio::test]
    async fn test_export_posts_envelopes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.1/track")
            .match_body(mockito::Matcher::Regex("ikey-123".to_string()))
            .with_status(200)
            .with_body(r#"{"itemsReceived":2,"itemsAccepted":2,"errors":[]}"#)
            .create_async()
            .await;

        let mut exporter = exporter(&server.url());
        let result = exporter.export(recorded_spans()).await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_export_rejection_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2.1/track")
            .with_status(400)
            .create_async()
            .await;

        let mut exporter = exporter(&server.url());
        assert!(exporter.export(recorded_spans()).await.is_err());
    }
}
