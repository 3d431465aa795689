use crate::models::{strings, ContentSource, Insights};

const BASE_ENGAGEMENT: f64 = 75.0;
const BASE_CLICK_RATE: f64 = 2.5;

fn trending_keywords(business_type: &str) -> &'static [&'static str] {
    match business_type {
        "E-commerce" => &["shop now", "limited time", "free shipping", "bestseller", "exclusive"],
        "SaaS" => &["productivity", "automation", "efficiency", "growth", "innovation"],
        "Restaurant" => &["fresh", "delicious", "local", "authentic", "seasonal"],
        "Fitness" => &["transform", "strength", "wellness", "results", "community"],
        "Education" => &["learn", "skills", "career", "certified", "expert"],
        "Healthcare" => &["wellness", "care", "trusted", "professional", "health"],
        "Real Estate" => &["dream home", "investment", "location", "luxury", "opportunity"],
        "Finance" => &["secure", "growth", "investment", "trusted", "financial"],
        "Travel" => &["adventure", "explore", "experience", "destination", "memories"],
        _ => &["quality", "reliable", "innovative", "trusted", "professional"],
    }
}

/// (engagement, click-rate) multipliers.
fn platform_multipliers(platform: &str) -> (f64, f64) {
    match platform {
        "Instagram" => (1.2, 0.9),
        "Facebook" => (1.0, 1.0),
        "LinkedIn" => (0.8, 1.3),
        "Twitter" => (1.1, 0.8),
        "Google Ads" => (0.7, 1.5),
        "TikTok" => (1.5, 0.7),
        _ => (1.0, 1.0),
    }
}

/// Static performance estimates for a business type on a platform.
pub fn lookup(business_type: &str, platform: &str) -> Insights {
    let (engagement, click_rate) = platform_multipliers(platform);
    // Half-up to one decimal, so 2.25 reads as 2.3.
    let click_rate = (BASE_CLICK_RATE * click_rate * 10.0).round() / 10.0;

    Insights {
        engagement: format!("{}%", (BASE_ENGAGEMENT * engagement).round() as i64),
        click_rate: format!("{:.1}%", click_rate),
        trending: strings(trending_keywords(business_type)),
        recommendations: vec![
            format!("Optimize for {} best practices", platform),
            "Use trending keywords in your copy".to_string(),
            "Include strong visual elements".to_string(),
            "Test different call-to-action phrases".to_string(),
        ],
        source: ContentSource::Table,
    }
}
