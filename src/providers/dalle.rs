use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::prompt::build_image_prompt;
use super::{read_json, ImageProvider, PayloadError, ProviderError, ProviderOutcome};
use crate::config::ProviderConfig;
use crate::models::GenerationRequest;

/// Provider C: single round trip to the OpenAI images endpoint.
pub struct DalleClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl DalleClient {
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl ImageProvider for DalleClient {
    fn name(&self) -> &'static str { "dalle" }

    fn api_type(&self) -> &'static str { "openai_image_generation" }

    fn is_available(&self) -> bool { self.api_key.is_some() }

    async fn generate_image(&self, request: &GenerationRequest) -> ProviderOutcome<String> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable("dalle"))?;
        let url = format!("{}/images/generations", self.base_url);
        let body = json!({
            "model": "dall-e-3",
            "prompt": build_image_prompt(request),
            "size": "1024x1024",
            "quality": "hd",
            "n": 1
        });

        info!("🔗 Requesting DALL-E image from {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(%status, "❌ DALL-E error response: {}", error_body);
            return Err(ProviderError::Transport(format!("status={} body={}", status, error_body)));
        }

        let parsed: ImagesResponse = read_json(response).await?;
        first_url(parsed).ok_or(ProviderError::InvalidPayload(PayloadError::MissingField("data[0].url")))
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData { #[serde(default)] url: Option<String> }

fn first_url(resp: ImagesResponse) -> Option<String> {
    resp.data
        .into_iter()
        .next()
        .and_then(|d| d.url)
        .filter(|u| !u.is_empty())
}
