use std::time::Duration;

use anyhow::{Context, Result};

use crate::polling::PollConfig;

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const REPLICATE_API_BASE: &str = "https://api.replicate.com/v1";
pub const POSTHOG_HOST: &str = "https://app.posthog.com";

/// Credential and endpoint for one provider. A missing key disables it.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub api_key: String,
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub groq: ProviderConfig,
    pub openai: ProviderConfig,
    pub replicate: ProviderConfig,
    pub telemetry: Option<TelemetryConfig>,
    pub poll: PollConfig,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values behave like unset ones.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = |key_var: &str, base_var: &str, default_base: &str| ProviderConfig {
            api_key: get(key_var),
            base_url: get(base_var)
                .unwrap_or_else(|| default_base.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let telemetry = get("POSTHOG_API_KEY").map(|api_key| TelemetryConfig {
            api_key,
            host: get("POSTHOG_HOST")
                .unwrap_or_else(|| POSTHOG_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
        });

        let mut poll = PollConfig::default();
        if let Some(raw) = get("POLL_MAX_ATTEMPTS") {
            poll.max_attempts = raw
                .parse::<u32>()
                .with_context(|| format!("POLL_MAX_ATTEMPTS must be a positive integer, got {raw:?}"))?
                .max(1);
        }
        if let Some(raw) = get("POLL_INTERVAL_SECS") {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("POLL_INTERVAL_SECS must be an integer, got {raw:?}"))?;
            poll.interval = Duration::from_secs(secs);
        }

        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT must be a valid port, got {raw:?}"))?,
            None => 8080,
        };

        Ok(Self {
            groq: provider("GROQ_API_KEY", "GROQ_API_BASE", GROQ_API_BASE),
            openai: provider("OPENAI_API_KEY", "OPENAI_API_BASE", OPENAI_API_BASE),
            replicate: provider("REPLICATE_API_KEY", "REPLICATE_API_BASE", REPLICATE_API_BASE),
            telemetry,
            poll,
            port,
        })
    }
}
