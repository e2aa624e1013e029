//! One-hot category vocabulary learned from the corpus itself.
//!
//! This is the data-driven category universe used by the feature matrix. It
//! is unrelated to the curated list in [`crate::category_match`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    /// Distinct category labels in column order (sorted).
    labels: Vec<String>,
}

impl CategoryVocabulary {
    /// Blank categories are not labels; their recipes get no category bit.
    pub fn fit<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let mut labels: Vec<String> = categories
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string)
            .collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Column of an exactly matching label, if the corpus knows it.
    pub fn column_of(&self, category: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(category)).ok()
    }
}
