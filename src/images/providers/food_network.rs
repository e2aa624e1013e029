use async_trait::async_trait;
use lol_html::element;

use super::{rejects_any, scan_html};
use crate::images::provider::{ImageProvider, ProviderError};
use crate::images::transport::Transport;

const SEARCH_URL: &str = "https://www.foodnetwork.com/search";

/// Food Network recipe search. Result images are lazy-loaded through
/// `data-src`.
pub struct FoodNetworkProvider;

impl FoodNetworkProvider {
    pub const NAME: &'static str = "food_network";
}

fn extract_candidates(html: &str) -> Result<Vec<String>, ProviderError> {
    let mut candidates: Vec<String> = Vec::new();
    scan_html(
        html,
        vec![element!("img[data-src]", |el| {
            if let Some(src) = el.get_attribute("data-src").filter(|s| !s.is_empty()) {
                if !rejects_any(&src, &["thumbnail"]) && !candidates.contains(&src) {
                    candidates.push(src);
                }
            }
            Ok(())
        })],
    )?;
    Ok(candidates)
}

#[async_trait]
impl ImageProvider for FoodNetworkProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(
        &self,
        transport: &Transport,
        recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/{}-", SEARCH_URL, urlencoding::encode(recipe_name));
        let html = transport.get_text(&url).await?;
        let candidates = extract_candidates(&html)?;
        Ok(transport.keep_verified(candidates, max_count).await)
    }
}
