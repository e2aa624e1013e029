use rand::seq::SliceRandom;

pub const DEFAULT_PLACEHOLDERS: [&str; 3] = [
    "https://drive.google.com/file/d/1gYOjs06yiq7EUXaO19BE-L7MkrTR6wlc/view?usp=sharing",
    "https://drive.google.com/file/d/1ob4KbzVLtwsE_ckYKBu_70FLEXNCJRSr/view?usp=sharing",
    "https://drive.google.com/file/d/1UUv3zF1ouXteZVt8Oc_UXORcJrlWfRXR/view?usp=sharing",
];

/// Fixed set of fallback image URLs used when nothing else was found.
#[derive(Debug, Clone)]
pub struct PlaceholderPool {
    urls: Vec<String>,
}

impl Default for PlaceholderPool {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()))
    }
}

impl PlaceholderPool {
    /// Duplicate URLs are dropped, keeping the first occurrence.
    pub fn new(urls: impl IntoIterator<Item = String>) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for url in urls {
            if !unique.contains(&url) {
                unique.push(url);
            }
        }
        Self { urls: unique }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// A random selection of `min(count, len)` distinct placeholders.
    pub fn pick(&self, count: usize) -> Vec<String> {
        let mut urls = self.urls.clone();
        urls.shuffle(&mut rand::rng());
        urls.truncate(count);
        urls
    }
}
