use async_trait::async_trait;
use lazy_static::lazy_static;
use lol_html::text;
use regex::Regex;

use super::scan_html;
use crate::images::provider::{ImageProvider, ProviderError};
use crate::images::transport::Transport;

lazy_static! {
    static ref IMAGE_URL: Regex = Regex::new(r"(https?://\S+\.(?:jpg|jpeg|png))").unwrap();
}

const SEARCH_URL: &str = "https://www.google.com/search";
const DATA_CALLBACK_MARKER: &str = "AF_initDataCallback";

/// Google image search. Result URLs are embedded in the inline data scripts
/// of the results page.
pub struct GoogleImagesProvider;

impl GoogleImagesProvider {
    pub const NAME: &'static str = "google";
}

/// Candidate URLs found in `AF_initDataCallback` scripts, in page order.
fn extract_candidates(html: &str) -> Result<Vec<String>, ProviderError> {
    let mut candidates: Vec<String> = Vec::new();
    let mut script = String::new();
    scan_html(
        html,
        vec![text!("script", |chunk| {
            script.push_str(chunk.as_str());
            if chunk.last_in_text_node() {
                if script.contains(DATA_CALLBACK_MARKER) {
                    for m in IMAGE_URL.find_iter(&script) {
                        let url = urlencoding::decode(m.as_str())
                            .map(|u| u.into_owned())
                            .unwrap_or_else(|_| m.as_str().to_string());
                        if !candidates.contains(&url) {
                            candidates.push(url);
                        }
                    }
                }
                script.clear();
            }
            Ok(())
        })],
    )?;
    Ok(candidates)
}

#[async_trait]
impl ImageProvider for GoogleImagesProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(
        &self,
        transport: &Transport,
        recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let query = format!("{} recipe food", recipe_name);
        let url = format!("{}?q={}&tbm=isch", SEARCH_URL, urlencoding::encode(&query));
        let html = transport.get_text(&url).await?;
        let candidates = extract_candidates(&html)?;
        Ok(transport.keep_verified(candidates, max_count).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_urls_from_data_callbacks_only() {
        let html = r#"<html><head>
            <script>var x = "https://ignored.example/a.jpg";</script>
            <script>AF_initDataCallback({data: ["https://img.example/pie.jpg", "https://img.example/pie%20slice.png", "https://img.example/pie.jpg"]});</script>
            </head><body><img src="https://img.example/body.jpg"></body></html>"#;
        let urls = extract_candidates(html).unwrap();
        assert_eq!(
            urls,
            vec!["https://img.example/pie.jpg", "https://img.example/pie slice.png"]
        );
    }

    #[test]
    fn page_without_callbacks_has_no_candidates() {
        let urls = extract_candidates("<html><body>nothing</body></html>").unwrap();
        assert!(urls.is_empty());
    }
}
