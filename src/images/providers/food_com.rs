use async_trait::async_trait;
use lazy_static::lazy_static;
use lol_html::element;
use regex::Regex;

use super::{rejects_any, scan_html};
use crate::images::provider::{ImageProvider, ProviderError};
use crate::images::transport::Transport;

lazy_static! {
    static ref SIZE_SEGMENT: Regex = Regex::new(r"s\d+-c").unwrap();
}

const SEARCH_URL: &str = "https://www.food.com/search";
const CHROME_MARKERS: [&str; 3] = ["icon", "logo", "advertisement"];

/// Food.com recipe search. Thumbnails are upsized to 800px.
pub struct FoodComProvider;

impl FoodComProvider {
    pub const NAME: &'static str = "food_com";
}

fn upsized(src: &str) -> String {
    SIZE_SEGMENT.replace_all(src, "s800-c").into_owned()
}

fn push_unique(list: &mut Vec<String>, url: String) {
    if !list.contains(&url) {
        list.push(url);
    }
}

/// Recipe-card images, or `img.recipe-image` when the page has no cards.
fn extract_candidates(html: &str) -> Result<Vec<String>, ProviderError> {
    let mut card_images: Vec<String> = Vec::new();
    let mut fallback_images: Vec<String> = Vec::new();
    scan_html(
        html,
        vec![
            element!("div.recipe-card img", |el| {
                if let Some(src) = el.get_attribute("data-src").filter(|s| !s.is_empty()) {
                    push_unique(&mut card_images, upsized(&src));
                }
                if let Some(src) = el.get_attribute("src").filter(|s| !s.is_empty()) {
                    if !rejects_any(&src, &CHROME_MARKERS) {
                        push_unique(&mut card_images, upsized(&src));
                    }
                }
                Ok(())
            }),
            element!("img.recipe-image", |el| {
                let src = el
                    .get_attribute("src")
                    .filter(|s| !s.is_empty())
                    .or_else(|| el.get_attribute("data-src"));
                if let Some(src) = src.filter(|s| !s.is_empty()) {
                    push_unique(&mut fallback_images, upsized(&src));
                }
                Ok(())
            }),
        ],
    )?;
    Ok(if card_images.is_empty() {
        fallback_images
    } else {
        card_images
    })
}

#[async_trait]
impl ImageProvider for FoodComProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(
        &self,
        transport: &Transport,
        recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/{}?pn=1", SEARCH_URL, urlencoding::encode(recipe_name));
        let html = transport.get_text(&url).await?;
        let candidates = extract_candidates(&html)?;
        Ok(transport.keep_verified(candidates, max_count).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsizes_recipe_card_images() {
        let html = r#"
            <div class="recipe-card">
              <img data-src="https://fc.example/img/s120-c/stew.jpg">
              <img src="https://fc.example/icons/star.png">
            </div>
            <div class="recipe-card"><img src="https://fc.example/img/s60-c/soup.jpg"></div>
            <img class="recipe-image" src="https://fc.example/hero.jpg">
        "#;
        assert_eq!(
            extract_candidates(html).unwrap(),
            vec![
                "https://fc.example/img/s800-c/stew.jpg",
                "https://fc.example/img/s800-c/soup.jpg"
            ]
        );
    }

    #[test]
    fn falls_back_to_recipe_images_without_cards() {
        let html = r#"<img class="recipe-image" data-src="https://fc.example/img/s250-c/pie.jpg">"#;
        assert_eq!(
            extract_candidates(html).unwrap(),
            vec!["https://fc.example/img/s800-c/pie.jpg"]
        );
    }
}
