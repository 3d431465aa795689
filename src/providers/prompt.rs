use crate::models::GenerationRequest;

pub const COPYWRITER_SYSTEM_PROMPT: &str = "You are an expert advertising copywriter and marketing strategist with 15+ years of experience creating high-converting ads across all digital platforms. You understand consumer psychology, platform-specific best practices, and current marketing trends.";

pub fn build_copy_prompt(req: &GenerationRequest) -> String {
    let extra = match &req.additional_info {
        Some(info) => format!("- Additional Requirements: {info}\n"),
        None => String::new(),
    };
    format!(
        "Create a compelling advertisement for the following:\n\n\
        BUSINESS DETAILS:\n\
        - Business Name: {business}\n\
        - Business Type: {business_type}\n\
        - Product/Service: {product}\n\
        - Description: {description}\n\n\
        TARGET & PLATFORM:\n\
        - Target Audience: {audience}\n\
        - Platform: {platform}\n\
        - Desired Tone: {tone}\n\
        {extra}\n\
        Please provide a JSON response with the following structure:\n\
        {{\n  \
        \"headline\": \"Attention-grabbing headline (max 60 characters for {platform})\",\n  \
        \"copy\": \"Compelling ad copy that speaks to the target audience (2-3 sentences, platform-optimized)\",\n  \
        \"cta\": \"Strong call-to-action button text (2-4 words)\",\n  \
        \"strategy\": \"Brief explanation of the marketing strategy behind this ad (1-2 sentences)\",\n  \
        \"keywords\": [\"relevant\", \"trending\", \"keywords\", \"for\", \"targeting\"]\n\
        }}\n\n\
        Make it {tone_lower}, engaging, and optimized for {platform}. Focus on benefits over features and create emotional connection with {audience}.",
        business = req.business_name,
        business_type = req.business_type,
        product = req.product_name,
        description = req.product_description,
        audience = req.target_audience,
        platform = req.platform,
        tone = req.tone,
        tone_lower = req.tone.to_lowercase(),
    )
}

fn platform_style(platform: &str) -> &'static str {
    match platform {
        "Instagram" => "vibrant, modern, mobile-optimized square format",
        "Facebook" => "engaging, social-friendly, eye-catching design",
        "LinkedIn" => "professional, clean, business-oriented aesthetic",
        "Twitter" => "bold, concise, attention-grabbing visual",
        "Google Ads" => "clean, conversion-focused, trustworthy design",
        "TikTok" => "dynamic, trendy, youth-oriented creative",
        _ => "modern, professional",
    }
}

fn tone_style(tone: &str) -> &'static str {
    match tone {
        "Professional" => "clean, sophisticated, minimalist design with corporate colors",
        "Friendly" => "warm, approachable, inviting with soft colors and friendly imagery",
        "Exciting" => "dynamic, energetic, bold with vibrant colors and action elements",
        "Luxury" => "premium, elegant, sophisticated with gold accents and high-end aesthetics",
        "Playful" => "fun, creative, colorful with playful elements and bright palette",
        "Urgent" => "attention-grabbing, bold, high-contrast with urgency indicators",
        _ => "modern and clean",
    }
}

/// Prompt shared by both image providers.
pub fn build_image_prompt(req: &GenerationRequest) -> String {
    format!(
        "Create a {platform_style} advertisement poster for \"{product}\" by {business}.\n\n\
        Style: {tone_style}\n\
        Target audience: {audience}\n\
        Business type: {business_type}\n\n\
        The design should be {tone_lower}, visually appealing, and optimized for {platform}. Include space for text overlay, use appropriate typography hierarchy, and ensure the design aligns with {business_type} industry standards. High quality, professional advertising design, 4K resolution.",
        platform_style = platform_style(&req.platform),
        product = req.product_name,
        business = req.business_name,
        tone_style = tone_style(&req.tone),
        audience = req.target_audience,
        business_type = req.business_type,
        tone_lower = req.tone.to_lowercase(),
        platform = req.platform,
    )
}
