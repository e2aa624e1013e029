//! Recommendation requests and their validation into a [`RecipeQuery`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::corpus::{DietaryFlag, WeightConfig};

pub const DEFAULT_TOP_N: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("{field} must be an integer, got {value}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("top_n must be a non-negative integer, got {0}")]
    InvalidTopN(i64),

    #[error("weight {0} must be a non-negative number")]
    InvalidWeight(&'static str),
}

/// A recommendation request as received from clients.
///
/// `calories` and `time` are kept as raw JSON values so that integral floats
/// and numeric strings can be accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub calories: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub keywords_name: Option<Vec<String>>,
    #[serde(default)]
    pub weights: Option<WeightConfig>,
    #[serde(default)]
    pub top_n: Option<i64>,
}

/// A validated query. Empty strings and empty lists count as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeQuery {
    pub category: Option<String>,
    pub dietary: Option<DietaryFlag>,
    pub ingredients: Vec<String>,
    pub calories: Option<i64>,
    pub time: Option<i64>,
    pub keywords: Vec<String>,
    pub keywords_name: Vec<String>,
    pub weights: Option<WeightConfig>,
    pub top_n: usize,
}

/// Accepts a JSON integer, an integral float or a string holding an integer.
fn parse_integer(field: &'static str, value: &Value) -> Result<i64, QueryError> {
    let invalid = || QueryError::InvalidInteger {
        field,
        value: value.to_string(),
    };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl RecommendationRequest {
    pub fn validate(self) -> Result<RecipeQuery, QueryError> {
        let calories = self
            .calories
            .as_ref()
            .filter(|v| !v.is_null())
            .map(|v| parse_integer("calories", v))
            .transpose()?;
        let time = self
            .time
            .as_ref()
            .filter(|v| !v.is_null())
            .map(|v| parse_integer("time", v))
            .transpose()?;

        let top_n = match self.top_n {
            None => DEFAULT_TOP_N,
            Some(n) if n >= 0 => n as usize,
            Some(n) => return Err(QueryError::InvalidTopN(n)),
        };

        if let Some(field) = self.weights.as_ref().and_then(WeightConfig::invalid_field) {
            return Err(QueryError::InvalidWeight(field));
        }

        let dietary = non_empty(self.dietary_preference).and_then(|name| {
            let flag = DietaryFlag::parse(&name);
            if flag.is_none() {
                debug!("Ignoring unknown dietary preference '{}'", name);
            }
            flag
        });

        Ok(RecipeQuery {
            category: non_empty(self.category),
            dietary,
            ingredients: self.ingredients.unwrap_or_default(),
            calories,
            time,
            keywords: self.keywords.unwrap_or_default(),
            keywords_name: self.keywords_name.unwrap_or_default(),
            weights: self.weights,
            top_n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> RecommendationRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_request_uses_defaults() {
        let query = request(json!({})).validate().unwrap();
        assert_eq!(query.top_n, DEFAULT_TOP_N);
        assert_eq!(query.category, None);
        assert!(query.ingredients.is_empty());
        assert_eq!(query.calories, None);
    }

    #[test]
    fn accepts_integer_like_values() {
        let query = request(json!({"calories": 200, "time": "30"}))
            .validate()
            .unwrap();
        assert_eq!(query.calories, Some(200));
        assert_eq!(query.time, Some(30));

        let query = request(json!({"calories": 250.0, "time": null}))
            .validate()
            .unwrap();
        assert_eq!(query.calories, Some(250));
        assert_eq!(query.time, None);
    }

    #[test]
    fn rejects_non_integer_values() {
        for bad in [json!("lots"), json!(12.5), json!(true), json!([1])] {
            let err = request(json!({ "time": bad })).validate().unwrap_err();
            assert!(matches!(err, QueryError::InvalidInteger { field: "time", .. }));
        }
    }

    #[test]
    fn parses_dietary_preference() {
        let query = request(json!({"dietary_preference": "is_vegan"}))
            .validate()
            .unwrap();
        assert_eq!(query.dietary, Some(DietaryFlag::Vegan));

        let query = request(json!({"dietary_preference": "pescatarian"}))
            .validate()
            .unwrap();
        assert_eq!(query.dietary, None);
    }

    #[test]
    fn blank_category_is_absent() {
        let query = request(json!({"category": "  "})).validate().unwrap();
        assert_eq!(query.category, None);
    }

    #[test]
    fn rejects_negative_top_n_and_weights() {
        assert_eq!(
            request(json!({"top_n": -1})).validate().unwrap_err(),
            QueryError::InvalidTopN(-1)
        );
        assert_eq!(
            request(json!({"weights": {"keywords": -0.5}}))
                .validate()
                .unwrap_err(),
            QueryError::InvalidWeight("keywords")
        );
    }
}
