//! OpenAI-compatible chat completions extractor.
//!
//! Works with any service that implements `POST {base_url}/chat/completions`.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AttributeExtractor, ExtractedAttributes, ExtractionError};

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)^```(?:json)?\s*\n(.*?)\n\s*```").unwrap();
}

const TEMPERATURE: f32 = 0.0;
const MAX_TOKENS: u32 = 150;

const SYSTEM_PROMPT: &str = "You extract recipe attributes from what a user types. \
When the dish is uncommon or does not belong to a usual category, add general \
culinary keywords such as 'beverages' for drinks or 'dessert' for sweets.";

const INSTRUCTIONS: &str = r#"Answer with a single JSON object with these keys:
- "category": the main dish type (for example "chicken" or "ice cream"), or "" when unusual.
- "calories": calories mentioned in the text, or "".
- "time": cooking time in minutes, or "".
- "ingredients": ingredients mentioned, plus the basic ones the dish needs (a cake needs "flour" and "sugar").
- "keywords": words that describe the recipe; for uncommon dishes add traits like "asian", "main course", "quick meal".
- "keywords_name": the individual words of the dish name, or related categories for uncommon dishes.

Input: "biryani"
Output: {"category": "", "calories": "", "time": "", "ingredients": ["rice", "spices", "oil", "onions"], "keywords": ["rice", "indian", "spicy", "main course", "one dish meal"], "keywords_name": ["rice", "indian", "spicy"]}

Input: "I wish to cook chicken soup which contains around 200 calories within 30 mins"
Output: {"category": "chicken", "calories": "200", "time": "30", "ingredients": ["chicken", "water", "vegetables", "salt"], "keywords": ["chicken", "soup"], "keywords_name": ["chicken", "soup"]}

Input: "chocolate cake with milk and sugar"
Output: {"category": "dessert", "calories": "", "time": "", "ingredients": ["chocolate", "milk", "sugar", "flour", "eggs", "butter"], "keywords": ["dessert", "baking", "sweet", "cake"], "keywords_name": ["dessert", "cake", "chocolate"]}
"#;

pub struct OpenAiExtractor {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAiExtractor {
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.openai.com/v1").
    /// * `model` - Model to use (e.g., "gpt-4o-mini").
    /// * `api_key` - Optional bearer token.
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

    fn request_for(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("{}\nInput: \"{}\"\nOutput:", INSTRUCTIONS, text),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Drops a surrounding markdown code fence, if the model added one.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

fn parse_attributes(content: &str) -> Result<ExtractedAttributes, ExtractionError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ExtractionError::Parse(format!("{}: {}", e, content)))
}

/// Posts one chat completions request and returns the text of the first
/// choice. Shared by the text and image clients.
pub(super) async fn complete<B: Serialize + ?Sized>(
    client: &Client,
    base_url: &str,
    api_key: Option<&str>,
    timeout: Duration,
    body: &B,
) -> Result<String, ExtractionError> {
    let url = format!("{}/chat/completions", base_url);

    let mut req_builder = client.post(&url).json(body);
    if let Some(api_key) = api_key {
        req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
    }

    let response = req_builder.timeout(timeout).send().await.map_err(|e| {
        if e.is_timeout() {
            ExtractionError::Timeout
        } else {
            ExtractionError::Connection(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Chat completions request failed");
        return Err(ExtractionError::Status {
            status: status.as_u16(),
            message: body,
        });
    }

    let chat: ChatResponse = response
        .json()
        .await
        .map_err(|e| ExtractionError::Parse(format!("Invalid chat response: {}", e)))?;
    chat.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ExtractionError::Parse("No choices in chat response".to_string()))
}

#[async_trait]
impl AttributeExtractor for OpenAiExtractor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(&self, text: &str) -> Result<ExtractedAttributes, ExtractionError> {
        debug!(model = %self.model, "Sending extraction request");
        let content = complete(
            &self.client,
            &self.base_url,
            self.api_key.as_deref(),
            self.timeout,
            &self.request_for(text),
        )
        .await?;
        parse_attributes(&content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_code_fence() {
        let fenced = "```json\n{\"category\": \"pie\"}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"category\": \"pie\"}");
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn parses_fenced_model_output() {
        let content = "```json\n{\"category\": \"chicken\", \"calories\": \"200\", \"time\": \"\", \
                       \"ingredients\": [\"chicken\"], \"keywords\": [\"soup\"], \"keywords_name\": [\"chicken\"]}\n```";
        let attrs = parse_attributes(content).unwrap();
        assert_eq!(attrs.category, "chicken");
        assert_eq!(attrs.calories, Some(json!("200")));
        assert_eq!(attrs.ingredients, vec!["chicken"]);
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_attributes("Sorry, I cannot help with that."),
            Err(ExtractionError::Parse(_))
        ));
    }

    #[test]
    fn request_carries_text_and_limits() {
        let extractor = OpenAiExtractor::new(
            "http://localhost:1/v1/",
            "test-model",
            None,
            Duration::from_secs(1),
        );
        let request = serde_json::to_value(extractor.request_for("beef tacos")).unwrap();
        assert_eq!(request["model"], "test-model");
        assert_eq!(request["max_tokens"], 150);
        assert_eq!(request["messages"][0]["role"], "system");
        assert!(request["messages"][1]["content"]
            .as_str()
            .unwrap()
            .ends_with("Input: \"beef tacos\"\nOutput:"));
        assert_eq!(extractor.base_url, "http://localhost:1/v1");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_connection_error() {
        let extractor = OpenAiExtractor::new(
            "http://127.0.0.1:9/v1",
            "test-model",
            None,
            Duration::from_secs(2),
        );
        let err = extractor.extract("pie").await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Connection(_) | ExtractionError::Timeout
        ));
    }
}
