use async_trait::async_trait;
use lol_html::element;

use super::{rejects_any, scan_html};
use crate::images::provider::{ImageProvider, ProviderError};
use crate::images::transport::Transport;

const SEARCH_URL: &str = "https://www.allrecipes.com/search";

/// Site chrome that shows up in `img` tags next to recipe photos.
const CHROME_MARKERS: [&str; 3] = ["icon", "logo", "advertisement"];

pub struct AllRecipesProvider;

impl AllRecipesProvider {
    pub const NAME: &'static str = "allrecipes";
}

fn extract_candidates(html: &str) -> Result<Vec<String>, ProviderError> {
    let mut candidates: Vec<String> = Vec::new();
    scan_html(
        html,
        vec![element!("img", |el| {
            let src = el
                .get_attribute("src")
                .filter(|s| !s.is_empty())
                .or_else(|| el.get_attribute("data-src"));
            if let Some(src) = src.filter(|s| !s.is_empty()) {
                if !rejects_any(&src, &CHROME_MARKERS) && !candidates.contains(&src) {
                    candidates.push(src);
                }
            }
            Ok(())
        })],
    )?;
    Ok(candidates)
}

#[async_trait]
impl ImageProvider for AllRecipesProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(
        &self,
        transport: &Transport,
        recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}?q={}", SEARCH_URL, urlencoding::encode(recipe_name));
        let html = transport.get_text(&url).await?;
        let candidates = extract_candidates(&html)?;
        Ok(transport.keep_verified(candidates, max_count).await)
    }
}
