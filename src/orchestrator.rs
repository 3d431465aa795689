use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::chain::{ImageChain, TextChain};
use crate::config::Config;
use crate::insights;
use crate::models::{strings, ContentSource, GeneratedCopy, GeneratedImage, GenerationRequest, GenerationResult, Insights};
use crate::polling::Poller;
use crate::providers::chat::ChatCompletionClient;
use crate::providers::dalle::DalleClient;
use crate::providers::replicate::ReplicateClient;
use crate::providers::{ImageProvider, TextProvider};
use crate::telemetry::{self, track_ad_generated, track_error, TelemetrySink};

const STOCK_IMAGE_URL: &str = "https://images.pexels.com/photos/3184291/pexels-photo-3184291.jpeg?auto=compress&cs=tinysrgb&w=800";

/// Runs the copy, image and insights branches for one request and merges
/// whatever they settle to.
#[derive(Clone)]
pub struct Orchestrator {
    text: Arc<TextChain>,
    image: Arc<ImageChain>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl Orchestrator {
    pub fn new(text: TextChain, image: ImageChain, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            text: Arc::new(text),
            image: Arc::new(image),
            telemetry,
        }
    }

    /// Wires the production providers from configuration.
    pub fn from_config(config: &Config) -> Self {
        let client = Client::new();
        let telemetry = telemetry::from_config(client.clone(), config.telemetry.as_ref());

        let text_providers: Vec<Arc<dyn TextProvider>> = vec![
            Arc::new(ChatCompletionClient::groq(client.clone(), &config.groq)),
            Arc::new(ChatCompletionClient::openai(client.clone(), &config.openai)),
        ];
        let image_providers: Vec<Arc<dyn ImageProvider>> = vec![
            Arc::new(DalleClient::new(client.clone(), &config.openai)),
            Arc::new(ReplicateClient::new(client, &config.replicate, Poller::new(config.poll.clone()))),
        ];

        Self::new(
            TextChain::new(text_providers, telemetry.clone()),
            ImageChain::new(image_providers, telemetry.clone()),
            telemetry,
        )
    }

    pub fn text_chain(&self) -> &TextChain {
        &self.text
    }

    /// Always returns a complete result. A branch that dies is replaced by a
    /// minimal default; if assembly itself dies, a last-resort result is
    /// returned instead.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let start = Instant::now();
        let generation_id = Uuid::new_v4();
        let span = info_span!("generate", %generation_id, platform = %request.platform, tone = %request.tone);

        info!(parent: &span, "🚀 Generating ad for {} by {}", request.product_name, request.business_name);

        let this = self.clone();
        let req = request.clone();
        let assembled = tokio::spawn(async move { this.assemble(req, start, generation_id).await }.instrument(span.clone())).await;

        match assembled {
            Ok(result) => result,
            Err(e) => {
                let elapsed = elapsed_ms(start);
                error!(parent: &span, error = %e, "❌ Ad generation failed, returning last-resort ad");
                track_error(self.telemetry.as_ref(), "ad_generation_failed", &e.to_string(), elapsed);
                last_resort_result(&request, elapsed)
            }
        }
    }

    async fn assemble(&self, request: GenerationRequest, start: Instant, generation_id: Uuid) -> GenerationResult {
        let text = {
            let chain = self.text.clone();
            let req = request.clone();
            spawn_branch(async move { chain.run(&req).await })
        };
        let image = {
            let chain = self.image.clone();
            let req = request.clone();
            spawn_branch(async move { chain.run(&req).await })
        };
        let lookup = {
            let (business_type, platform) = (request.business_type.clone(), request.platform.clone());
            spawn_branch(async move { insights::lookup(&business_type, &platform) })
        };

        // Join all three; a failed branch never cancels its siblings.
        let (text, image, lookup) = tokio::join!(text, image, lookup);

        let copy = text.unwrap_or_else(|e| {
            error!(error = %e, "Text branch failed");
            minimal_copy(&request)
        });
        let image = image.unwrap_or_else(|e| {
            error!(error = %e, "Image branch failed");
            minimal_image()
        });
        let insights = lookup.unwrap_or_else(|e| {
            error!(error = %e, "Insights branch failed");
            minimal_insights()
        });

        let generation_time_ms = elapsed_ms(start);
        track_ad_generated(self.telemetry.as_ref(), generation_id, &request, image.source.is_provider(), generation_time_ms);
        info!(generation_time_ms, copy_source = ?copy.source, image_source = ?image.source, "✅ Ad generated");

        GenerationResult { copy, image, insights, generation_time_ms }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Spawns one branch of a generation inside the caller's span.
fn spawn_branch<F>(branch: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(branch.in_current_span())
}

fn minimal_copy(req: &GenerationRequest) -> GeneratedCopy {
    GeneratedCopy {
        headline: format!("Transform Your Business with {}", req.product_name),
        copy: format!("Discover how {} is revolutionizing {}.", req.business_name, req.business_type.to_lowercase()),
        cta: "Get Started Today".to_string(),
        strategy: "Focus on transformation and innovation.".to_string(),
        keywords: strings(&["innovation", "transform", "business"]),
        source: ContentSource::Minimal,
    }
}

fn minimal_image() -> GeneratedImage {
    GeneratedImage { url: STOCK_IMAGE_URL.to_string(), source: ContentSource::Minimal }
}

fn minimal_insights() -> Insights {
    Insights {
        engagement: "75%".to_string(),
        click_rate: "2.5%".to_string(),
        trending: strings(&["trending", "popular", "effective"]),
        recommendations: strings(&["Use strong visuals", "Include clear CTA"]),
        source: ContentSource::Minimal,
    }
}

fn last_resort_result(req: &GenerationRequest, generation_time_ms: u64) -> GenerationResult {
    GenerationResult {
        copy: GeneratedCopy {
            headline: format!("Discover {}", req.product_name),
            copy: format!("{} brings you innovative solutions for {}.", req.business_name, req.target_audience),
            cta: "Learn More".to_string(),
            strategy: "Simple and direct approach to highlight key benefits.".to_string(),
            keywords: strings(&["discover", "innovative", "solutions"]),
            source: ContentSource::Minimal,
        },
        image: minimal_image(),
        insights: Insights {
            engagement: "70%".to_string(),
            click_rate: "2.0%".to_string(),
            trending: strings(&["discover", "innovative", "solutions"]),
            recommendations: strings(&["Try different tone", "Add more specific details"]),
            source: ContentSource::Minimal,
        },
        generation_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::default_copy;
    use crate::chain::testing::{Behavior, FakeImage, FakeText};
    use crate::models::sample_request;
    use crate::telemetry::testing::MemorySink;
    use crate::telemetry::Properties;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tracing::Span;

    fn build(text: Vec<Arc<dyn TextProvider>>, image: Vec<Arc<dyn ImageProvider>>) -> (Orchestrator, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        let orchestrator = Orchestrator::new(
            TextChain::new(text, sink.clone()),
            ImageChain::new(image, sink.clone()),
            sink.clone(),
        );
        (orchestrator, sink)
    }

    /// Panics while emitting `ad_generated`, i.e. during assembly.
    struct ExplodingSink;

    impl TelemetrySink for ExplodingSink {
        fn emit(&self, event: &str, _properties: Properties) {
            if event == "ad_generated" {
                panic!("sink exploded");
            }
        }
    }

    #[tokio::test]
    async fn unconfigured_providers_yield_defaults_end_to_end() {
        let config = Config::from_lookup(|_| None).unwrap();
        let result = Orchestrator::from_config(&config).generate(sample_request()).await;

        assert_eq!(result.copy, default_copy(&sample_request()));
        assert_eq!(result.image.url, "https://via.placeholder.com/1024x1024/4F46E5/FFFFFF?text=Widget%0Aby%20Acme");
        assert_eq!(result.image.source, ContentSource::Fallback);
        assert_eq!(result.insights.trending, strings(&["productivity", "automation", "efficiency", "growth", "innovation"]));
        assert_eq!(result.insights.engagement, "60%");
        assert_eq!(result.insights.click_rate, "3.3%");
    }

    #[tokio::test]
    async fn reports_completion_telemetry() {
        let (orchestrator, sink) = build(
            vec![FakeText::new("groq", Behavior::Succeed)],
            vec![FakeImage::new("dalle", Behavior::Succeed)],
        );

        let result = orchestrator.generate(sample_request()).await;

        assert_eq!(result.copy.source, ContentSource::provider("groq"));
        assert_eq!(result.image.url, "https://img/dalle.png");
        let done = sink.named("ad_generated");
        assert_eq!(done.len(), 1);
        assert_eq!(done[0]["has_image"], true);
        assert_eq!(done[0]["business_name"], "Acme");
        assert_eq!(done[0]["platform"], "LinkedIn");
        assert_eq!(done[0]["tone"], "Professional");
        assert_eq!(done[0]["generation_time_ms"], result.generation_time_ms);
        assert_eq!(sink.events().last().map(|(name, _)| name.as_str()), Some("ad_generated"));
    }

    #[tokio::test]
    async fn placeholder_image_is_not_reported_as_real() {
        let (orchestrator, sink) = build(vec![], vec![FakeImage::new("dalle", Behavior::Fail)]);

        orchestrator.generate(sample_request()).await;

        assert_eq!(sink.named("ad_generated")[0]["has_image"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn branches_run_concurrently() {
        let slow_text = FakeText::new("groq", Behavior::SucceedAfter(Duration::from_secs(5)));
        let failing_image = FakeImage::new("dalle", Behavior::Fail);
        let (orchestrator, _) = build(vec![slow_text], vec![failing_image.clone(), FakeImage::new("replicate", Behavior::SucceedAfter(Duration::from_secs(3)))]);

        let result = orchestrator.generate(sample_request()).await;

        assert_eq!(failing_image.calls(), 1);
        assert_eq!(result.image.url, "https://img/replicate.png");
        assert!(result.generation_time_ms >= 5_000, "took {}ms", result.generation_time_ms);
        assert!(result.generation_time_ms < 8_000, "branches ran sequentially: {}ms", result.generation_time_ms);
    }

    #[tokio::test]
    async fn panicking_branch_gets_minimal_default_without_cancelling_siblings() {
        let (orchestrator, _) = build(
            vec![FakeText::new("groq", Behavior::Panic)],
            vec![FakeImage::new("dalle", Behavior::Succeed)],
        );

        let result = orchestrator.generate(sample_request()).await;

        assert_eq!(result.copy.source, ContentSource::Minimal);
        assert_eq!(result.copy.copy, "Discover how Acme is revolutionizing saas.");
        assert_eq!(result.image.url, "https://img/dalle.png");
        assert_eq!(result.insights.source, ContentSource::Table);

        let (orchestrator, _) = build(vec![FakeText::new("groq", Behavior::Succeed)], vec![FakeImage::new("dalle", Behavior::Panic)]);
        let result = orchestrator.generate(sample_request()).await;
        assert_eq!(result.image.url, STOCK_IMAGE_URL);
        assert_eq!(result.copy.source, ContentSource::provider("groq"));
    }

    #[tokio::test]
    async fn assembly_failure_returns_last_resort_result() {
        let sink = Arc::new(ExplodingSink);
        let orchestrator = Orchestrator::new(
            TextChain::new(vec![], sink.clone()),
            ImageChain::new(vec![], sink.clone()),
            sink,
        );

        let result = orchestrator.generate(sample_request()).await;

        assert_eq!(result.copy.headline, "Discover Widget");
        assert_eq!(result.copy.copy, "Acme brings you innovative solutions for developers.");
        assert_eq!(result.copy.cta, "Learn More");
        assert_eq!(result.insights.engagement, "70%");
        assert_eq!(result.insights.click_rate, "2.0%");
        assert_eq!(result.image.source, ContentSource::Minimal);
    }

    #[tokio::test]
    async fn branches_inherit_the_generation_span() {
        let _subscriber = tracing::subscriber::set_default(tracing_subscriber::registry());

        let seen = async {
            let lookup = spawn_branch(async { Span::current().metadata().map(|m| m.name()) });
            lookup.await.unwrap()
        }
        .instrument(info_span!("generate"))
        .await;

        assert_eq!(seen, Some("generate"));
    }
}
