//! Free-text recipe attribute extraction.
//!
//! An [`AttributeExtractor`] turns a sentence such as "chicken soup under
//! 200 calories" into structured attributes. The attributes are then
//! normalized against the curated category list and turned into a
//! [`RecipeQuery`] that uses the extraction weight profile. Food photos go
//! through an [`ImageDescriber`] first and then follow the same path.

mod openai;
mod vision;

pub use openai::OpenAiExtractor;
pub use vision::{OpenAiImageDescriber, FALLBACK_DESCRIPTION};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::category_match::find_closest_category;
use crate::corpus::WeightConfig;
use crate::recommend::{QueryError, RecipeQuery, RecommendationRequest};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Extraction service error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Could not parse extracted attributes: {0}")]
    Parse(String),

    #[error("Attribute extraction is not configured")]
    NotConfigured,
}

/// Attributes as produced by the extraction model.
///
/// `calories` and `time` stay raw because models answer with numbers,
/// numeric strings or empty strings interchangeably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedAttributes {
    pub category: String,
    pub calories: Option<Value>,
    pub time: Option<Value>,
    pub ingredients: Vec<String>,
    pub keywords: Vec<String>,
    pub keywords_name: Vec<String>,
}

#[async_trait]
pub trait AttributeExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, text: &str) -> Result<ExtractedAttributes, ExtractionError>;
}

/// Turns a food photo into a short text description that an
/// [`AttributeExtractor`] can work from.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    fn name(&self) -> &str;

    async fn describe(&self, image: &[u8], content_type: &str) -> Result<String, ExtractionError>;
}

/// Extra terms added when the text names something outside the category list.
struct ContextHint {
    trigger: &'static str,
    keywords: &'static [&'static str],
    keywords_name: &'static [&'static str],
    ingredients: &'static [&'static str],
}

const fn hint(
    trigger: &'static str,
    keywords: &'static [&'static str],
    keywords_name: &'static [&'static str],
    ingredients: &'static [&'static str],
) -> ContextHint {
    ContextHint {
        trigger,
        keywords,
        keywords_name,
        ingredients,
    }
}

// First trigger found in the lowercased text wins, so longer phrases come
// before the words they contain ("smoothie bowl" before "smoothie").
const CONTEXT_HINTS: &[ContextHint] = &[
    hint(
        "coffee",
        &["coffee", "beverages", "caffeinated", "hot drink"],
        &["beverages", "caffeinated", "coffee"],
        &["coffee beans", "water"],
    ),
    hint(
        "latte",
        &["coffee", "beverages", "caffeinated", "hot drink"],
        &["beverages", "caffeinated", "coffee"],
        &["coffee beans", "water"],
    ),
    hint(
        "smoothie bowl",
        &["beverages", "healthy", "smoothie bowl"],
        &["beverages", "smoothie bowl"],
        &["fruits", "yogurt", "granola"],
    ),
    hint(
        "kombucha",
        &["beverage", "fermented", "kombucha"],
        &["beverages", "kombucha"],
        &["tea", "sugar", "SCOBY"],
    ),
    hint(
        "herbal tea",
        &["beverages", "caffeine-free", "herbal tea"],
        &["beverages", "herbal tea"],
        &["herbs", "water"],
    ),
    hint(
        "seaweed",
        &["ingredient", "seafood", "seaweed"],
        &["seaweed"],
        &["seaweed"],
    ),
    hint(
        "vegan cheese",
        &["dairy-free", "vegan", "cheese"],
        &["vegan cheese"],
        &["cashews", "nutritional yeast", "coconut oil"],
    ),
    hint(
        "air fryer",
        &["cooking method", "air fryer", "healthy"],
        &["air fryer"],
        &[],
    ),
    hint(
        "instant pot",
        &["cooking method", "instant pot", "pressure cooker"],
        &["instant pot"],
        &[],
    ),
    hint(
        "sous vide",
        &["cooking method", "sous vide", "precision cooking"],
        &["sous vide"],
        &[],
    ),
    hint("paleo", &["diet", "paleo", "low-carb"], &["paleo"], &[]),
    hint(
        "fodmap",
        &["diet", "fodmap", "digestive health"],
        &["fodmap"],
        &[],
    ),
    hint(
        "cold brew",
        &["beverages", "caffeinated", "cold coffee"],
        &["beverages", "cold brew"],
        &["coffee grounds", "water"],
    ),
    hint(
        "matcha",
        &["beverages", "green tea", "matcha"],
        &["beverages", "matcha"],
        &["matcha powder", "water", "milk"],
    ),
    hint(
        "smoothie",
        &["beverages", "healthy", "smoothie"],
        &["beverages", "smoothie"],
        &["fruits", "milk", "yogurt"],
    ),
    hint(
        "protein shake",
        &["beverages", "high protein", "shake"],
        &["beverages", "protein shake"],
        &["protein powder", "milk", "banana"],
    ),
    hint(
        "oat milk",
        &["dairy-free", "vegan", "plant-based milk"],
        &["oat milk"],
        &["oats", "water"],
    ),
    hint(
        "almond milk",
        &["dairy-free", "vegan", "plant-based milk"],
        &["almond milk"],
        &["almonds", "water"],
    ),
    hint(
        "zoodles",
        &["low carb", "gluten-free", "vegetable noodles", "noodles"],
        &["zoodles", "noodles"],
        &["zucchini"],
    ),
    hint(
        "avocado toast",
        &["breakfast", "healthy", "avocado"],
        &["avocado toast"],
        &["avocado", "bread"],
    ),
    hint(
        "golden milk",
        &["beverage", "turmeric", "anti-inflammatory"],
        &["golden milk"],
        &["turmeric", "milk", "honey", "spices"],
    ),
];

fn extend(target: &mut Vec<String>, extra: &[&str]) {
    target.extend(extra.iter().map(|s| s.to_string()));
}

/// Maps the extracted category onto the curated list.
///
/// A category that had to be corrected also replaces `keywords_name` with
/// its words. When nothing matches, the category is cleared and the
/// original text is checked for a [`ContextHint`] trigger.
pub fn normalize_attributes(mut attrs: ExtractedAttributes, text: &str) -> ExtractedAttributes {
    let guess = attrs.category.trim().to_string();
    let matched = find_closest_category(&guess);

    if !matched.is_empty() {
        if matched != guess {
            debug!("Normalized category '{}' to '{}'", guess, matched);
            attrs.keywords_name = matched.split_whitespace().map(str::to_string).collect();
        }
        attrs.category = matched;
        return attrs;
    }

    attrs.category = String::new();
    let lowered = text.to_lowercase();
    if let Some(hint) = CONTEXT_HINTS.iter().find(|h| lowered.contains(h.trigger)) {
        debug!("Enriching uncategorized text with '{}' context", hint.trigger);
        extend(&mut attrs.keywords, hint.keywords);
        extend(&mut attrs.keywords_name, hint.keywords_name);
        extend(&mut attrs.ingredients, hint.ingredients);
    }
    attrs
}

/// Zero, empty strings and nulls all mean "not mentioned".
fn mentioned(value: Option<Value>) -> Option<Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    })
}

impl ExtractedAttributes {
    /// Builds the recommendation query for these attributes with the
    /// extraction weight profile.
    pub fn into_query(self) -> Result<RecipeQuery, QueryError> {
        RecommendationRequest {
            category: Some(self.category),
            dietary_preference: None,
            ingredients: Some(self.ingredients),
            calories: mentioned(self.calories),
            time: mentioned(self.time),
            keywords: Some(self.keywords),
            keywords_name: Some(self.keywords_name),
            weights: Some(WeightConfig::extraction()),
            top_n: None,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(category: &str) -> ExtractedAttributes {
        ExtractedAttributes {
            category: category.to_string(),
            keywords: vec!["soup".to_string()],
            keywords_name: vec!["chicken".to_string(), "soup".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn exact_category_keeps_keywords_name() {
        let normalized = normalize_attributes(attrs("chicken"), "chicken soup");
        assert_eq!(normalized.category, "chicken");
        assert_eq!(normalized.keywords_name, vec!["chicken", "soup"]);
    }

    #[test]
    fn corrected_category_rewrites_keywords_name() {
        let normalized = normalize_attributes(attrs("spicy pork"), "spicy pork ribs");
        assert_eq!(normalized.category, "pork");
        assert_eq!(normalized.keywords_name, vec!["pork"]);

        let normalized = normalize_attributes(attrs("Ice Cream"), "ice cream");
        assert_eq!(normalized.category, "ice cream");
        assert_eq!(normalized.keywords_name, vec!["ice", "cream"]);
    }

    #[test]
    fn unmatched_category_uses_context_hint() {
        let mut input = attrs("xyzzy");
        input.ingredients = vec!["milk".to_string()];
        let normalized = normalize_attributes(input, "An iced LATTE please");
        assert_eq!(normalized.category, "");
        assert_eq!(
            normalized.keywords,
            vec!["soup", "coffee", "beverages", "caffeinated", "hot drink"]
        );
        assert_eq!(normalized.ingredients, vec!["milk", "coffee beans", "water"]);
    }

    #[test]
    fn first_matching_hint_wins() {
        let normalized = normalize_attributes(attrs(""), "a smoothie bowl with granola");
        assert_eq!(normalized.ingredients, vec!["fruits", "yogurt", "granola"]);
        assert!(normalized.keywords.contains(&"smoothie bowl".to_string()));
    }

    #[test]
    fn unmatched_without_hint_is_left_alone() {
        let normalized = normalize_attributes(attrs("xyzzy"), "something odd");
        assert_eq!(normalized.category, "");
        assert_eq!(normalized.keywords, vec!["soup"]);
        assert_eq!(normalized.keywords_name, vec!["chicken", "soup"]);
    }

    #[test]
    fn query_uses_extraction_weights_and_drops_unmentioned_numbers() {
        let mut input = attrs("chicken");
        input.calories = Some(json!("200"));
        input.time = Some(json!(""));
        let query = input.into_query().unwrap();
        assert_eq!(query.category.as_deref(), Some("chicken"));
        assert_eq!(query.calories, Some(200));
        assert_eq!(query.time, None);
        assert_eq!(query.weights, Some(WeightConfig::extraction()));

        let mut input = attrs("");
        input.calories = Some(json!(0));
        let query = input.into_query().unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.calories, None);
    }

    #[test]
    fn non_numeric_time_is_rejected() {
        let mut input = attrs("chicken");
        input.time = Some(json!("half an hour"));
        assert!(matches!(
            input.into_query(),
            Err(QueryError::InvalidInteger { field: "time", .. })
        ));
    }

    #[test]
    fn deserializes_model_output_with_missing_fields() {
        let parsed: ExtractedAttributes =
            serde_json::from_str(r#"{"category": "dessert", "calories": 350}"#).unwrap();
        assert_eq!(parsed.category, "dessert");
        assert_eq!(parsed.calories, Some(json!(350)));
        assert!(parsed.ingredients.is_empty());
    }
}
