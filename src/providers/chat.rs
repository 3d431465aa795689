use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use super::prompt::{build_copy_prompt, COPYWRITER_SYSTEM_PROMPT};
use super::{read_json, PayloadError, ProviderError, ProviderOutcome, TextProvider};
use crate::config::ProviderConfig;
use crate::models::{ContentSource, GeneratedCopy, GenerationRequest};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Groq and OpenAI speak the same protocol, so both text providers are
/// instances of this client with a different model and endpoint.
pub struct ChatCompletionClient {
    client: Client,
    name: &'static str,
    api_type: &'static str,
    model: &'static str,
    api_key: Option<String>,
    base_url: String,
}

impl ChatCompletionClient {
    /// Provider A: fast primary.
    pub fn groq(client: Client, config: &ProviderConfig) -> Self {
        Self::new(client, "groq", "groq_text_generation", "llama3-70b-8192", config)
    }

    /// Provider B: quality secondary.
    pub fn openai(client: Client, config: &ProviderConfig) -> Self {
        Self::new(client, "openai", "openai_text_generation", "gpt-4", config)
    }

    fn new(client: Client, name: &'static str, api_type: &'static str, model: &'static str, config: &ProviderConfig) -> Self {
        Self {
            client,
            name,
            api_type,
            model,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    async fn perform_api_call(&self, api_key: &str, req: &GenerationRequest) -> ProviderOutcome<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": COPYWRITER_SYSTEM_PROMPT },
                { "role": "user", "content": build_copy_prompt(req) }
            ],
            "max_tokens": 800,
            "temperature": 0.85,
            "response_format": { "type": "json_object" }
        });

        info!(provider = self.name, model = self.model, "🔗 Requesting ad copy from {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(provider = self.name, %status, "❌ Chat completion failed: {}", error_body);
            return Err(ProviderError::Transport(format!("status={} body={}", status, error_body)));
        }

        let parsed: ChatResponse = read_json(response).await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TextProvider for ChatCompletionClient {
    fn name(&self) -> &'static str { self.name }

    fn api_type(&self) -> &'static str { self.api_type }

    fn is_available(&self) -> bool { self.api_key.is_some() }

    async fn generate_copy(&self, request: &GenerationRequest) -> ProviderOutcome<GeneratedCopy> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable(self.name))?;
        let content = self.perform_api_call(api_key, request).await?;
        let copy = parse_ad_copy(&content, self.name)?;
        info!(provider = self.name, headline = %copy.headline, "✅ Ad copy generated");
        Ok(copy)
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice { message: Message }

#[derive(Debug, Deserialize)]
struct Message { #[serde(default)] content: Option<String> }

fn required(payload: &Map<String, Value>, field: &'static str) -> Result<String, PayloadError> {
    match payload.get(field) {
        Some(Value::String(v)) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(PayloadError::MissingField(field)),
    }
}

/// Checks the model's JSON against the ad copy schema. The content must be a
/// JSON object whose `headline`, `copy` and `cta` are non-blank strings.
/// `strategy` and `keywords` are best effort: a missing or mistyped value
/// reads as empty, and non-string keywords are dropped.
pub fn parse_ad_copy(content: &str, provider: &str) -> Result<GeneratedCopy, PayloadError> {
    if content.trim().is_empty() {
        return Err(PayloadError::Empty);
    }
    let payload = match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        Ok(other) => return Err(PayloadError::Malformed(format!("expected a JSON object, got {}", kind_of(&other)))),
        Err(e) => return Err(PayloadError::Malformed(e.to_string())),
    };

    Ok(GeneratedCopy {
        headline: required(&payload, "headline")?,
        copy: required(&payload, "copy")?,
        cta: required(&payload, "cta")?,
        strategy: payload.get("strategy").and_then(Value::as_str).unwrap_or_default().to_string(),
        keywords: payload
            .get("keywords")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
        source: ContentSource::provider(provider),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
