use serde::{Serialize, Deserialize};
use serde_with::{serde_as, NoneAsEmptyString};

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationRequest {
    pub business_name: String,
    pub business_type: String,
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    pub platform: String, // e.g., Instagram, LinkedIn
    pub tone: String, // e.g., Professional, Playful
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Where a piece of generated content came from, so callers can disclose
/// degraded output.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ContentSource {
    /// Produced by the named network provider.
    Provider(String),
    /// Static lookup tables.
    Table,
    /// Chain-level synthesized default.
    Fallback,
    /// Orchestrator last-resort default.
    Minimal,
}

impl ContentSource {
    pub fn provider(name: &str) -> Self {
        Self::Provider(name.to_string())
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedCopy {
    pub headline: String,
    pub copy: String,
    pub cta: String,
    pub strategy: String,
    pub keywords: Vec<String>,
    pub source: ContentSource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedImage {
    pub url: String,
    pub source: ContentSource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Insights {
    pub engagement: String,
    pub click_rate: String,
    pub trending: Vec<String>,
    pub recommendations: Vec<String>,
    pub source: ContentSource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationResult {
    pub copy: GeneratedCopy,
    pub image: GeneratedImage,
    pub insights: Insights,
    pub generation_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CopyRequest {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(default = "default_prefer_primary")]
    pub prefer_primary: bool,
}

fn default_prefer_primary() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub business_type: String,
    pub platform: String,
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
pub(crate) fn sample_request() -> GenerationRequest {
    GenerationRequest {
        business_name: "Acme".into(),
        business_type: "SaaS".into(),
        product_name: "Widget".into(),
        product_description: "A widget for dashboards".into(),
        target_audience: "developers".into(),
        platform: "LinkedIn".into(),
        tone: "Professional".into(),
        additional_info: None,
    }
}
