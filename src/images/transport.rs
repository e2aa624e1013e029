//! HTTP transport shared by all image providers during one recommendation
//! request.

use std::collections::HashSet;
use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::provider::ProviderError;

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Safari/605.1.15",
];

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Markers of stock images that are not worth returning.
const REJECTED_URL_MARKERS: [&str; 3] = ["placeholder", "default", "missing"];

pub struct Transport {
    client: Client,
}

impl Transport {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    /// Browser-like headers with a randomly chosen user agent.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        headers.insert(USER_AGENT, HeaderValue::from_static(agent));
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
        headers
    }

    /// GETs `url` and returns the body, failing on any non-200 status.
    pub async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self.client.get(url).headers(self.headers()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .headers(self.headers())
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// True when `url` answers a HEAD request with 200 and an image content
    /// type, and does not look like a stock placeholder.
    pub async fn verify_image_url(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        if REJECTED_URL_MARKERS.iter().any(|m| lowered.contains(m)) {
            return false;
        }
        let response = match self.client.head(url).headers(self.headers()).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("HEAD {} failed: {}", url, err);
                return false;
            }
        };
        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("image"));
        response.status() == StatusCode::OK && is_image
    }

    /// Verifies candidates one by one, skipping duplicates, until
    /// `max_count` have passed.
    pub async fn keep_verified(
        &self,
        candidates: impl IntoIterator<Item = String>,
        max_count: usize,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut verified = Vec::new();
        for url in candidates {
            if verified.len() >= max_count {
                break;
            }
            if !seen.insert(url.clone()) {
                continue;
            }
            if self.verify_image_url(&url).await {
                verified.push(url);
            }
        }
        verified
    }
}
