//! Encodes a [`RecipeQuery`] into the feature space of a [`Corpus`].

use crate::corpus::{Corpus, RowBuilder, WeightConfig};

use super::query::RecipeQuery;

/// A query encoded as a sparse row with the same width as the corpus feature
/// matrix. Entries are sorted by column and contain no zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    width: usize,
    entries: Vec<(usize, f64)>,
}

impl QueryVector {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct QueryEncoder<'a> {
    corpus: &'a Corpus,
}

impl<'a> QueryEncoder<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    /// Every absent query field leaves its block of columns at zero.
    pub fn encode(&self, query: &RecipeQuery, weights: &WeightConfig) -> QueryVector {
        let encoders = self.corpus.encoders();
        let layout = self.corpus.layout();
        let mut row = RowBuilder::new();

        if !query.ingredients.is_empty() {
            row.block(
                layout.ingredients_offset(),
                &encoders.ingredients.transform(&query.ingredients.join(" ")),
                weights.ingredients,
            );
        }

        if let Some(column) = query
            .category
            .as_deref()
            .and_then(|c| encoders.categories.column_of(c))
        {
            row.value(layout.category_offset() + column, weights.category);
        }

        if let Some(flag) = query.dietary {
            row.value(layout.dietary_offset() + flag.index(), weights.dietary);
        }

        if let Some(calories) = query.calories {
            row.value(
                layout.calories_offset(),
                encoders.scalers.calories.transform(calories as f64) * weights.calories,
            );
        }

        if let Some(time) = query.time {
            row.value(
                layout.time_offset(),
                encoders.scalers.time.transform(time as f64) * weights.time,
            );
        }

        if !query.keywords.is_empty() {
            row.block(
                layout.keywords_offset(),
                &encoders.keywords.transform(&query.keywords.join(" ")),
                weights.keywords,
            );
        }

        if !query.keywords_name.is_empty() {
            row.block(
                layout.keywords_name_offset(),
                &encoders.keywords_name.transform(&query.keywords_name.join(" ")),
                weights.keywords_name,
            );
        }

        let entries = row.finish().into_iter().filter(|(_, v)| *v != 0.0).collect();

        QueryVector {
            width: layout.width(),
            entries,
        }
    }
}
