use crate::models::GenerationRequest;

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/1024x1024";

fn tone_color(tone: &str) -> &'static str {
    match tone {
        "Professional" => "4F46E5",
        "Friendly" => "10B981",
        "Exciting" => "F59E0B",
        "Luxury" => "D97706",
        "Playful" => "EC4899",
        "Urgent" => "EF4444",
        _ => "6366F1",
    }
}

/// Provider E: derives a placeholder image URL from the request. Never fails.
pub fn placeholder_url(req: &GenerationRequest) -> String {
    let text = format!("{}\nby {}", req.product_name, req.business_name);
    format!(
        "{}/{}/FFFFFF?text={}",
        PLACEHOLDER_BASE,
        tone_color(&req.tone),
        urlencoding::encode(&text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_request;
    use pretty_assertions::assert_eq;

    #[test]
    fn professional_tone_uses_indigo() {
        assert_eq!(
            placeholder_url(&sample_request()),
            "https://via.placeholder.com/1024x1024/4F46E5/FFFFFF?text=Widget%0Aby%20Acme"
        );
    }

    #[test]
    fn unknown_tone_uses_default_color() {
        let mut req = sample_request();
        req.tone = "Sarcastic".into();
        assert!(placeholder_url(&req).contains("/6366F1/FFFFFF?"));
        req.tone = "Playful".into();
        assert!(placeholder_url(&req).contains("/EC4899/FFFFFF?"));
    }
}
