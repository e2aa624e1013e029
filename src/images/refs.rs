//! Extraction of image URLs from the raw `Images` text stored with a recipe.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref R_VECTOR_ITEM: Regex = Regex::new(r#""([^"]*)""#).unwrap();
    static ref BARE_URL: Regex = Regex::new(r#"https?://[^\s,"')]+"#).unwrap();
}

/// URLs found in a recipe's image reference text.
///
/// R vectors (`c("https://...", ...)`) yield their quoted items that start
/// with `http`; any other text is scanned for bare `http(s)://` URLs. `NA`
/// and empty text yield nothing.
pub fn extract_image_urls(refs: &str) -> Vec<String> {
    let trimmed = refs.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        return Vec::new();
    }
    match trimmed
        .strip_prefix("c(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(content) => R_VECTOR_ITEM
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|item| item.starts_with("http"))
            .map(str::to_string)
            .collect(),
        None => BARE_URL
            .find_iter(trimmed)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}
