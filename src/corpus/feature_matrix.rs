//! Sparse weighted feature matrix and its column layout.

use serde::{Deserialize, Serialize};

use super::recipe::DietaryFlag;

/// Widths of each feature block, in the fixed column order:
/// ingredients, category, dietary, calories, time, keywords, keywords_name,
/// rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub ingredients: usize,
    pub category: usize,
    pub keywords: usize,
    pub keywords_name: usize,
}

impl FeatureLayout {
    pub const DIETARY_WIDTH: usize = DietaryFlag::ALL.len();

    pub fn ingredients_offset(&self) -> usize {
        0
    }

    pub fn category_offset(&self) -> usize {
        self.ingredients
    }

    pub fn dietary_offset(&self) -> usize {
        self.category_offset() + self.category
    }

    pub fn calories_offset(&self) -> usize {
        self.dietary_offset() + Self::DIETARY_WIDTH
    }

    pub fn time_offset(&self) -> usize {
        self.calories_offset() + 1
    }

    pub fn keywords_offset(&self) -> usize {
        self.time_offset() + 1
    }

    pub fn keywords_name_offset(&self) -> usize {
        self.keywords_offset() + self.keywords
    }

    pub fn rating_offset(&self) -> usize {
        self.keywords_name_offset() + self.keywords_name
    }

    pub fn width(&self) -> usize {
        self.rating_offset() + 1
    }
}

/// Row-compressed sparse matrix. Column indices inside a row are strictly
/// increasing; explicit zeros are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_cols: usize,
    row_offsets: Vec<usize>,
    columns: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            row_offsets: vec![0],
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a row given as `(column, value)` pairs sorted by column.
    pub fn push_row(&mut self, entries: impl IntoIterator<Item = (usize, f64)>) {
        for (column, value) in entries {
            debug_assert!(column < self.n_cols);
            if value != 0.0 {
                self.columns.push(column);
                self.values.push(value);
            }
        }
        self.row_offsets.push(self.columns.len());
    }

    pub fn n_rows(&self) -> usize {
        self.row_offsets.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Non-zero entries of row `i`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_offsets[i]..self.row_offsets[i + 1];
        self.columns[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Internal consistency check used when loading persisted matrices.
    pub fn is_well_formed(&self) -> bool {
        self.row_offsets.first() == Some(&0)
            && self.row_offsets.last() == Some(&self.columns.len())
            && self.columns.len() == self.values.len()
            && self.row_offsets.windows(2).all(|w| w[0] <= w[1])
            && self.columns.iter().all(|c| *c < self.n_cols)
    }
}

/// Helper that assembles one matrix row block by block.
pub(crate) struct RowBuilder {
    entries: Vec<(usize, f64)>,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds sparse block entries shifted by `offset` and scaled by `weight`.
    pub fn block(&mut self, offset: usize, entries: &[(usize, f64)], weight: f64) -> &mut Self {
        self.entries
            .extend(entries.iter().map(|(c, v)| (offset + c, v * weight)));
        self
    }

    pub fn value(&mut self, column: usize, value: f64) -> &mut Self {
        self.entries.push((column, value));
        self
    }

    pub fn finish(self) -> Vec<(usize, f64)> {
        self.entries
    }
}
