//! Vocabulary-based TF-IDF text encoder.
//!
//! Documents are lowercased and split into word tokens of two or more word
//! characters. Stop words are optionally dropped before n-grams are formed.
//! The vocabulary is capped to the most frequent terms of the fitting corpus
//! and laid out alphabetically, which makes the column order a pure function
//! of the input documents.
//!
//! Weights follow the smoothed IDF convention:
//! `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, each row is `tf * idf` and is
//! then L2-normalized.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::stop_words::is_stop_word;

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").expect("valid token regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEncoderConfig {
    /// Maximum number of vocabulary terms kept after fitting.
    pub max_features: usize,
    /// Largest n-gram length produced (1 = single words only).
    pub ngram_max: usize,
    pub filter_stop_words: bool,
}

impl TextEncoderConfig {
    pub const INGREDIENTS: TextEncoderConfig = TextEncoderConfig {
        max_features: 5000,
        ngram_max: 2,
        filter_stop_words: true,
    };

    pub const KEYWORDS: TextEncoderConfig = TextEncoderConfig {
        max_features: 3000,
        ngram_max: 1,
        filter_stop_words: true,
    };
}

/// Persisted form of a fitted encoder; the term lookup table is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct StoredTextEncoder {
    config: TextEncoderConfig,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTextEncoder", into = "StoredTextEncoder")]
pub struct TextEncoder {
    config: TextEncoderConfig,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    term_index: HashMap<String, usize>,
}

impl From<StoredTextEncoder> for TextEncoder {
    fn from(stored: StoredTextEncoder) -> Self {
        let term_index = index_terms(&stored.vocabulary);
        Self {
            config: stored.config,
            vocabulary: stored.vocabulary,
            idf: stored.idf,
            term_index,
        }
    }
}

impl From<TextEncoder> for StoredTextEncoder {
    fn from(encoder: TextEncoder) -> Self {
        Self {
            config: encoder.config,
            vocabulary: encoder.vocabulary,
            idf: encoder.idf,
        }
    }
}

fn index_terms(vocabulary: &[String]) -> HashMap<String, usize> {
    vocabulary
        .iter()
        .enumerate()
        .map(|(i, term)| (term.clone(), i))
        .collect()
}

impl TextEncoder {
    /// Fits the vocabulary and IDF weights on `documents`.
    ///
    /// An all-empty corpus yields an encoder with no columns, which encodes
    /// every document as an empty row.
    pub fn fit<S: AsRef<str>>(documents: &[S], config: TextEncoderConfig) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let terms = analyze(document.as_ref(), &config);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *corpus_frequency.entry(term.clone()).or_default() += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.clone()).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = corpus_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort();

        let n_documents = documents.len() as f64;
        let idf = vocabulary
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let term_index = index_terms(&vocabulary);
        Self {
            config,
            vocabulary,
            idf,
            term_index,
        }
    }

    /// Number of columns this encoder produces.
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Encodes a document as sorted `(column, weight)` pairs with unit L2 norm.
    /// Terms outside the fitted vocabulary are ignored.
    pub fn transform(&self, document: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in analyze(document, &self.config) {
            if let Some(&column) = self.term_index.get(&term) {
                *counts.entry(column).or_default() += 1.0;
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();
        row.sort_by_key(|(column, _)| *column);

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in row.iter_mut() {
                *w /= norm;
            }
        }
        row
    }
}

/// Tokenizes and expands a document into the terms counted by the encoder.
fn analyze(document: &str, config: &TextEncoderConfig) -> Vec<String> {
    let lowered = document.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !config.filter_stop_words || !is_stop_word(token))
        .collect();

    let mut terms = Vec::with_capacity(tokens.len() * config.ngram_max.max(1));
    for n in 1..=config.ngram_max.max(1) {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}
