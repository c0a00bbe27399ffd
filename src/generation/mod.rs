//! Contract with the external image generation provider.
//!
//! The ledger never generates images itself; it prices a request by tier,
//! charges for it, and hands it to an [`ImageGenerator`].

pub mod api_key;

use std::{fmt, str::FromStr};

use crate::{
    common::error::LedgerError,
    domain::account::{Credits, Tier},
};

/// Hard ceiling on images per request, whatever the tier.
pub const MAX_IMAGES_PER_REQUEST: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Square,
    Widescreen,
    Tall,
    Landscape,
    Portrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Tall,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown aspect ratio: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub count: u8,
    pub aspect_ratio: AspectRatio,
}

/// One generated image, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub base64_data: String,
}

impl ImagePayload {
    pub fn png(base64_data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            base64_data: base64_data.into(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("API key is not configured")]
    NotConfigured,
    #[error("the configured API key is invalid")]
    InvalidKey,
    #[error("API quota exceeded")]
    QuotaExceeded,
    #[error("image generation blocked: {0}")]
    Blocked(String),
    #[error("image generation failed: {0}")]
    Failed(String),
}

impl GenerationError {
    /// Map a raw provider error message onto a variant.
    pub fn classify(message: &str) -> Self {
        if message.contains("API key not valid") {
            GenerationError::InvalidKey
        } else if message.to_ascii_lowercase().contains("quota") {
            GenerationError::QuotaExceeded
        } else if let Some(reason) = block_reason(message) {
            GenerationError::Blocked(reason)
        } else if message.trim().is_empty() {
            GenerationError::Failed("Failed to generate images. Please try again.".to_string())
        } else {
            GenerationError::Failed(message.to_string())
        }
    }
}

/// `Image generation blocked: SAFETY. Please ...` -> `SAFETY`.
fn block_reason(message: &str) -> Option<String> {
    let at = message.to_ascii_lowercase().find("blocked")?;
    let rest = message[at + "blocked".len()..].trim_start_matches([':', ' ']);
    let reason = rest.split('.').next().unwrap_or_default().trim();
    Some(if reason.is_empty() {
        "unspecified".to_string()
    } else {
        reason.to_string()
    })
}

/// The provider call. A single blocking request; no retries.
pub trait ImageGenerator {
    fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<Vec<ImagePayload>, GenerationError>;
}

/// What a tier may request and what it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    pub cost_per_image: Credits,
    pub max_images: u8,
    pub all_ratios: bool,
}

impl TierLimits {
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Pro => Self {
                cost_per_image: 2,
                max_images: 4,
                all_ratios: true,
            },
            Tier::Basic => Self {
                cost_per_image: 3,
                max_images: 2,
                all_ratios: true,
            },
            Tier::Free => Self {
                cost_per_image: 4,
                max_images: 1,
                all_ratios: false,
            },
        }
    }

    pub fn allows(&self, ratio: AspectRatio) -> bool {
        self.all_ratios || ratio == AspectRatio::Square
    }

    pub fn cost(&self, count: u8) -> Credits {
        self.cost_per_image * Credits::from(count)
    }

    pub fn check(&self, request: &GenerationRequest) -> Result<(), LedgerError> {
        if request.count == 0 || request.count > MAX_IMAGES_PER_REQUEST {
            return Err(LedgerError::validation(format!(
                "image count must be between 1 and {MAX_IMAGES_PER_REQUEST}"
            )));
        }
        if request.count > self.max_images {
            return Err(LedgerError::validation(format!(
                "your tier allows at most {} image(s) per request",
                self.max_images
            )));
        }
        if !self.allows(request.aspect_ratio) {
            return Err(LedgerError::validation(format!(
                "aspect ratio {} requires a paid tier",
                request.aspect_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(count: u8, aspect_ratio: AspectRatio) -> GenerationRequest {
        GenerationRequest {
            prompt: "a lighthouse at dusk".into(),
            count,
            aspect_ratio,
        }
    }

    #[test]
    fn pricing_per_tier() {
        assert_eq!(TierLimits::for_tier(Tier::Free).cost(1), 4);
        assert_eq!(TierLimits::for_tier(Tier::Basic).cost(2), 6);
        assert_eq!(TierLimits::for_tier(Tier::Pro).cost(4), 8);
    }

    #[test]
    fn free_tier_is_square_single_image() {
        let free = TierLimits::for_tier(Tier::Free);
        assert!(free.check(&request(1, AspectRatio::Square)).is_ok());
        assert!(free.check(&request(2, AspectRatio::Square)).is_err());
        assert!(free.check(&request(1, AspectRatio::Widescreen)).is_err());
    }

    #[test]
    fn pro_tier_caps_at_four() {
        let pro = TierLimits::for_tier(Tier::Pro);
        assert!(pro.check(&request(4, AspectRatio::Portrait)).is_ok());
        assert!(pro.check(&request(5, AspectRatio::Square)).is_err());
        assert!(pro.check(&request(0, AspectRatio::Square)).is_err());
    }

    #[test]
    fn aspect_ratio_parses_its_labels() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), ratio);
        }
        assert!("2:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn classifies_provider_messages() {
        assert_eq!(
            GenerationError::classify("400: API key not valid. Please pass a valid API key."),
            GenerationError::InvalidKey
        );
        assert_eq!(
            GenerationError::classify("Resource has been exhausted (e.g. check quota)."),
            GenerationError::QuotaExceeded
        );
        assert_eq!(
            GenerationError::classify("Image generation blocked: SAFETY. Please modify your prompt."),
            GenerationError::Blocked("SAFETY".into())
        );
        assert_eq!(
            GenerationError::classify("Prompt was BLOCKED"),
            GenerationError::Blocked("unspecified".into())
        );
        assert!(matches!(
            GenerationError::classify("socket hang up"),
            GenerationError::Failed(msg) if msg == "socket hang up"
        ));
    }

    #[test]
    fn data_url_is_inline_png() {
        assert_eq!(ImagePayload::png("QUJD").data_url(), "data:image/png;base64,QUJD");
    }
}
