//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per API endpoint. When API routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /api/health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// GET /api/form-data
    pub async fn form_data(&self) -> Response {
        self.client
            .get(format!("{}/api/form-data", self.base_url))
            .send()
            .await
            .expect("Form data request failed")
    }

    /// POST /api/recommend
    pub async fn recommend(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/recommend", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Recommend request failed")
    }

    /// POST /api/recommend, asserting success and returning the records
    pub async fn recommend_ok(&self, body: Value) -> Vec<Value> {
        let response = self.recommend(body).await;
        let status = response.status();
        let text = response.text().await.expect("Failed to read recommend response");
        assert_eq!(status, reqwest::StatusCode::OK, "Recommend failed: {}", text);
        serde_json::from_str(&text).expect("Invalid recommend response")
    }

    /// POST /api/extract-recipe-attributes
    pub async fn extract(&self, text: &str) -> Response {
        self.client
            .post(format!("{}/api/extract-recipe-attributes", self.base_url))
            .json(&json!({ "text": text }))
            .send()
            .await
            .expect("Extract request failed")
    }

    /// POST /api/analyze-food-image with `data` as the `image` field
    pub async fn analyze_image(&self, file_name: &str, mime: &str, data: Vec<u8>) -> Response {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Invalid mime type");
        let form = reqwest::multipart::Form::new().part("image", part);
        self.client
            .post(format!("{}/api/analyze-food-image", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Analyze image request failed")
    }
}

/// Recipe names of a recommendation response, in order.
pub fn names(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["Name"].as_str().unwrap_or_default().to_string())
        .collect()
}
