//! Fire-and-forget product analytics.
//!
//! The orchestrator only sees [`TelemetrySink`]; which backend receives the
//! events is decided once at start-up.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TelemetryConfig;
use crate::models::GenerationRequest;

pub type Properties = Map<String, Value>;

pub trait TelemetrySink: Send + Sync {
    /// Must not block and must not fail; delivery problems are the sink's own.
    fn emit(&self, event: &str, properties: Properties);
}

/// Used when no analytics key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn emit(&self, event: &str, _properties: Properties) {
        debug!(event, "telemetry disabled, dropping event");
    }
}

/// Sends events to a PostHog-compatible `/capture/` endpoint.
pub struct PostHogSink {
    client: Client,
    api_key: String,
    endpoint: String,
    distinct_id: String,
}

impl PostHogSink {
    pub fn new(client: Client, config: &TelemetryConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/capture/", config.host),
            distinct_id: Uuid::new_v4().to_string(),
        }
    }

    fn payload(&self, event: &str, properties: Properties) -> Value {
        json!({
            "api_key": self.api_key,
            "event": event,
            "distinct_id": self.distinct_id,
            "properties": properties,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }
}

impl TelemetrySink for PostHogSink {
    fn emit(&self, event: &str, properties: Properties) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(event, "no async runtime, telemetry event dropped");
            return;
        };
        let body = self.payload(event, properties);
        let request = self.client.post(&self.endpoint).json(&body);
        let event = event.to_string();
        handle.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => debug!(%event, "telemetry event delivered"),
                Ok(resp) => warn!(%event, status = %resp.status(), "telemetry endpoint rejected event"),
                Err(e) => warn!(%event, error = %e, "failed to send telemetry event"),
            }
        });
    }
}

pub fn from_config(client: Client, config: Option<&TelemetryConfig>) -> Arc<dyn TelemetrySink> {
    match config {
        Some(config) => Arc::new(PostHogSink::new(client, config)),
        None => {
            warn!("PostHog API key not found. Analytics will be disabled.");
            Arc::new(NoopSink)
        }
    }
}

fn timestamped(mut properties: Properties) -> Properties {
    properties.insert("timestamp".into(), Value::String(Utc::now().to_rfc3339()));
    properties
}

fn object(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => Properties::new(),
    }
}

/// `api_call`, emitted before each provider network call.
pub fn track_api_call(sink: &dyn TelemetrySink, api_type: &str, req: &GenerationRequest) {
    sink.emit("api_call", timestamped(object(json!({
        "api_type": api_type,
        "platform": req.platform,
        "tone": req.tone,
        "business_type": req.business_type,
    }))));
}

/// `ad_generated`, emitted once per completed generation.
pub fn track_ad_generated(sink: &dyn TelemetrySink, generation_id: Uuid, req: &GenerationRequest, has_image: bool, generation_time_ms: u64) {
    sink.emit("ad_generated", timestamped(object(json!({
        "generation_id": generation_id.to_string(),
        "business_name": req.business_name,
        "business_type": req.business_type,
        "platform": req.platform,
        "tone": req.tone,
        "has_image": has_image,
        "generation_time_ms": generation_time_ms,
    }))));
}

pub fn track_error(sink: &dyn TelemetrySink, error_type: &str, error_message: &str, generation_time_ms: u64) {
    sink.emit("error_occurred", timestamped(object(json!({
        "error_type": error_type,
        "error_message": error_message,
        "generation_time_ms": generation_time_ms,
    }))));
}
