//! Ordered provider fallback for copy and imagery.
//!
//! Both chains run the same loop: skip unconfigured providers, tag an
//! `api_call` event, attempt, and move on at the first error. When the list
//! is exhausted a deterministic default is synthesized, so `run` never fails.

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{strings, ContentSource, GeneratedCopy, GeneratedImage, GenerationRequest};
use crate::providers::placeholder::placeholder_url;
use crate::providers::{ImageProvider, TextProvider};
use crate::telemetry::{track_api_call, TelemetrySink};

#[derive(Clone)]
pub struct TextChain {
    providers: Vec<Arc<dyn TextProvider>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl TextChain {
    pub fn new(providers: Vec<Arc<dyn TextProvider>>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { providers, telemetry }
    }

    pub async fn run(&self, request: &GenerationRequest) -> GeneratedCopy {
        self.run_preferring(request, true).await
    }

    /// With `prefer_primary == false` the provider order is reversed.
    pub async fn run_preferring(&self, request: &GenerationRequest, prefer_primary: bool) -> GeneratedCopy {
        let ordered: Vec<&Arc<dyn TextProvider>> = if prefer_primary {
            self.providers.iter().collect()
        } else {
            self.providers.iter().rev().collect()
        };

        for provider in ordered {
            if !provider.is_available() {
                info!(provider = provider.name(), "⏭️ Text provider not configured, skipping");
                continue;
            }
            track_api_call(self.telemetry.as_ref(), provider.api_type(), request);
            match provider.generate_copy(request).await {
                Ok(copy) => return copy,
                Err(e) => warn!(provider = provider.name(), error = %e, "🔄 Text provider failed, falling back"),
            }
        }

        warn!(product = %request.product_name, "📦 All text providers failed, using template copy");
        default_copy(request)
    }
}

/// Template copy used when every text provider fails.
pub fn default_copy(req: &GenerationRequest) -> GeneratedCopy {
    GeneratedCopy {
        headline: format!("Transform Your Business with {}", req.product_name),
        copy: format!(
            "Discover how {} is revolutionizing {} with our innovative {}. Perfect for {}, our solution delivers exceptional results that exceed expectations.",
            req.business_name,
            req.business_type.to_lowercase(),
            req.product_name,
            req.target_audience
        ),
        cta: "Get Started Today".to_string(),
        strategy: "This ad focuses on transformation and innovation to appeal to forward-thinking customers.".to_string(),
        keywords: strings(&["innovation", "transform", "business", "solution", "results"]),
        source: ContentSource::Fallback,
    }
}

#[derive(Clone)]
pub struct ImageChain {
    providers: Vec<Arc<dyn ImageProvider>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl ImageChain {
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { providers, telemetry }
    }

    pub async fn run(&self, request: &GenerationRequest) -> GeneratedImage {
        for provider in &self.providers {
            if !provider.is_available() {
                info!(provider = provider.name(), "⏭️ Image provider not configured, skipping");
                continue;
            }
            track_api_call(self.telemetry.as_ref(), provider.api_type(), request);
            match provider.generate_image(request).await {
                Ok(url) => {
                    info!(provider = provider.name(), %url, "🖼️ Image generated");
                    return GeneratedImage { url, source: ContentSource::provider(provider.name()) };
                }
                Err(e) => warn!(provider = provider.name(), error = %e, "🔄 Image provider failed, falling back"),
            }
        }

        let url = placeholder_url(request);
        info!(%url, "📦 Using placeholder image");
        GeneratedImage { url, source: ContentSource::Fallback }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::providers::{PayloadError, ProviderError, ProviderOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub enum Behavior {
        Unconfigured,
        Fail,
        Succeed,
        SucceedAfter(Duration),
        Panic,
    }

    pub struct FakeText {
        pub name: &'static str,
        pub behavior: Behavior,
        pub calls: AtomicUsize,
    }

    impl FakeText {
        pub fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self { name, behavior, calls: AtomicUsize::new(0) })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextProvider for FakeText {
        fn name(&self) -> &'static str { self.name }
        fn api_type(&self) -> &'static str { "fake_text_generation" }
        fn is_available(&self) -> bool { !matches!(self.behavior, Behavior::Unconfigured) }

        async fn generate_copy(&self, _request: &GenerationRequest) -> ProviderOutcome<GeneratedCopy> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Unconfigured => Err(ProviderError::Unavailable(self.name)),
                Behavior::Fail => Err(ProviderError::InvalidPayload(PayloadError::MissingField("cta"))),
                Behavior::Succeed => Ok(copy_from(self.name)),
                Behavior::SucceedAfter(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(copy_from(self.name))
                }
                Behavior::Panic => panic!("text provider bug"),
            }
        }
    }

    pub fn copy_from(name: &str) -> GeneratedCopy {
        GeneratedCopy {
            headline: format!("{name} headline"),
            copy: format!("{name} copy"),
            cta: "Buy".into(),
            strategy: String::new(),
            keywords: vec![],
            source: ContentSource::provider(name),
        }
    }

    pub struct FakeImage {
        pub name: &'static str,
        pub behavior: Behavior,
        pub calls: AtomicUsize,
    }

    impl FakeImage {
        pub fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self { name, behavior, calls: AtomicUsize::new(0) })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageProvider for FakeImage {
        fn name(&self) -> &'static str { self.name }
        fn api_type(&self) -> &'static str { "fake_image_generation" }
        fn is_available(&self) -> bool { !matches!(self.behavior, Behavior::Unconfigured) }

        async fn generate_image(&self, _request: &GenerationRequest) -> ProviderOutcome<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Unconfigured => Err(ProviderError::Unavailable(self.name)),
                Behavior::Fail => Err(ProviderError::Timeout { attempts: 30 }),
                Behavior::Succeed => Ok(format!("https://img/{}.png", self.name)),
                Behavior::SucceedAfter(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(format!("https://img/{}.png", self.name))
                }
                Behavior::Panic => panic!("image provider bug"),
            }
        }
    }
}
