use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::prompt::build_image_prompt;
use super::{read_json, ImageProvider, ProviderError, ProviderOutcome};
use crate::config::ProviderConfig;
use crate::models::GenerationRequest;
use crate::polling::{JobStatusSource, PollStatus, Poller};

const SDXL_VERSION: &str = "db21e45b23baa09cfa0b90e29dcce353df49dbb37cd30cd23767aa53d0f3f80e";

/// Provider D: submits an SDXL prediction and polls it to completion.
pub struct ReplicateClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    poller: Poller,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

impl ReplicateClient {
    pub fn new(client: Client, config: &ProviderConfig, poller: Poller) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            poller,
        }
    }

    fn api_key(&self) -> ProviderOutcome<&str> {
        self.api_key.as_deref().ok_or(ProviderError::Unavailable("replicate"))
    }

    async fn submit(&self, prompt: &str) -> ProviderOutcome<String> {
        let api_key = self.api_key()?;
        let seed: u32 = rand::thread_rng().gen_range(0..1_000_000);
        let body = json!({
            "version": SDXL_VERSION,
            "input": {
                "prompt": prompt,
                "width": 1024,
                "height": 1024,
                "scheduler": "K_EULER",
                "num_outputs": 1,
                "guidance_scale": 7.5,
                "num_inference_steps": 50,
                "seed": seed
            }
        });

        let response = self.client
            .post(format!("{}/predictions", self.base_url))
            .header("Authorization", format!("Token {}", api_key))
            .json(&body)
            .send()
            .await?;

        let prediction = read_prediction(response).await?;
        info!(job_id = %prediction.id, status = %prediction.status, "📤 Replicate prediction submitted");
        Ok(prediction.id)
    }
}

async fn read_prediction(response: Response) -> ProviderOutcome<Prediction> {
    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        error!(%status, "❌ Replicate API error: {}", error_body);
        return Err(ProviderError::Transport(format!("Replicate API error: {}", status)));
    }
    read_json(response).await
}

fn to_poll_status(prediction: Prediction) -> PollStatus {
    match prediction.status.as_str() {
        "starting" => PollStatus::Pending,
        "succeeded" => match prediction.output.and_then(|o| o.into_iter().next()).filter(|u| !u.is_empty()) {
            Some(url) => PollStatus::Succeeded(url),
            // Output can lag the status flip; keep waiting.
            None => PollStatus::Processing,
        },
        "failed" => PollStatus::Failed(prediction.error.unwrap_or_else(|| "unknown error".into())),
        "canceled" => PollStatus::Failed("canceled".into()),
        _ => PollStatus::Processing,
    }
}

#[async_trait]
impl JobStatusSource for ReplicateClient {
    async fn status(&self, job_id: &str) -> ProviderOutcome<PollStatus> {
        let api_key = self.api_key()?;
        let response = self.client
            .get(format!("{}/predictions/{}", self.base_url, job_id))
            .header("Authorization", format!("Token {}", api_key))
            .send()
            .await?;
        Ok(to_poll_status(read_prediction(response).await?))
    }
}

#[async_trait]
impl ImageProvider for ReplicateClient {
    fn name(&self) -> &'static str { "replicate" }

    fn api_type(&self) -> &'static str { "replicate_image_generation" }

    fn is_available(&self) -> bool { self.api_key.is_some() }

    async fn generate_image(&self, request: &GenerationRequest) -> ProviderOutcome<String> {
        let job_id = self.submit(&build_image_prompt(request)).await?;
        self.poller.poll(self, &job_id).await
    }
}
