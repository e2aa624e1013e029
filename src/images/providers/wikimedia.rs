//! Wikimedia Commons file search through the MediaWiki API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::images::provider::{ImageProvider, ProviderError};
use crate::images::transport::Transport;

const API_URL: &str = "https://commons.wikimedia.org/w/api.php";
const FILE_PATH_URL: &str = "https://commons.wikimedia.org/wiki/Special:FilePath";
const FILE_NAMESPACE: &str = "6";

pub struct WikimediaProvider;

impl WikimediaProvider {
    pub const NAME: &'static str = "wikimedia";
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
}

/// Direct file URLs for the `File:` hits of a search response.
fn file_urls(response: SearchResponse) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for hit in response.query.map(|q| q.search).unwrap_or_default() {
        if let Some(file) = hit.title.strip_prefix("File:") {
            let url = format!("{}/{}", FILE_PATH_URL, urlencoding::encode(file));
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

#[async_trait]
impl ImageProvider for WikimediaProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(
        &self,
        transport: &Transport,
        recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("list", "search".to_string()),
            ("srsearch", format!("{} food", recipe_name)),
            ("srnamespace", FILE_NAMESPACE.to_string()),
            ("srlimit", max_count.to_string()),
        ];
        let response: SearchResponse = transport.get_json(API_URL, &params).await?;
        Ok(transport.keep_verified(file_urls(response), max_count).await)
    }
}
