//! Food photo description through an OpenAI-compatible vision model.
//!
//! The photo is sent inline as a base64 data URL. The model answers with a
//! short "dish, ingredient, ..." line that is then fed to the text
//! extractor like any typed query.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::openai::complete;
use super::{ExtractionError, ImageDescriber};

const TEMPERATURE: f32 = 0.0;
const MAX_TOKENS: u32 = 100;

/// Used when the model returns nothing usable.
pub const FALLBACK_DESCRIPTION: &str = "food dish";

const DESCRIBE_PROMPT: &str = r#"Look at this food image and:
1. Identify the main dish or food item.
2. List visible ingredients or components, including the individual words of the main dish.
3. Return ONLY a simple description in this format: [main dish], [ingredients]
For example: "pizza, pizza, cheese, tomatoes, basil" or "chocolate cake, chocolate, cake, frosting, berries""#;

pub struct OpenAiImageDescriber {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAiImageDescriber {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            timeout,
        }
    }

    fn request_for(&self, image: &[u8], content_type: &str) -> VisionRequest {
        VisionRequest {
            model: self.model.clone(),
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: DESCRIBE_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", content_type, STANDARD.encode(image)),
                        },
                    },
                ],
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Lowercased, without quotes, never empty.
fn clean_description(raw: &str) -> String {
    let cleaned = raw.trim().to_lowercase().replace(['"', '\''], "");
    match cleaned.trim() {
        "" => FALLBACK_DESCRIPTION.to_string(),
        text => text.to_string(),
    }
}

#[async_trait]
impl ImageDescriber for OpenAiImageDescriber {
    fn name(&self) -> &str {
        "openai-vision"
    }

    async fn describe(&self, image: &[u8], content_type: &str) -> Result<String, ExtractionError> {
        debug!(model = %self.model, bytes = image.len(), "Sending image description request");
        let content = complete(
            &self.client,
            &self.base_url,
            self.api_key.as_deref(),
            self.timeout,
            &self.request_for(image, content_type),
        )
        .await?;
        Ok(clean_description(&content))
    }
}

#[derive(Debug, Serialize)]
struct VisionRequest {
    model: String,
    messages: Vec<VisionMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct VisionMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}
