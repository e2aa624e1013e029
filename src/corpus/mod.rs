//! The recipe corpus: recipe table, fitted feature encoders and the weighted
//! feature matrix built from them.
//!
//! A [`Corpus`] is built once (or loaded from the artifact cache) and is
//! read-only afterwards, so it can be shared behind an `Arc` by every request.

mod cache;
mod category;
mod feature_matrix;
mod ingest;
mod recipe;
mod scaler;
mod stop_words;
mod text_encoder;
mod weights;

pub use cache::{load_or_build, ArtifactCache};
pub use category::CategoryVocabulary;
pub use feature_matrix::{FeatureLayout, FeatureMatrix};
pub(crate) use feature_matrix::RowBuilder;
pub use ingest::{load_recipes_csv, parse_list_literal, parse_r_vector, read_recipes};
pub use recipe::{DietaryFlag, DietaryFlags, Recipe};
pub use scaler::{MinMaxScaler, NumericScalers};
pub use text_encoder::{TextEncoder, TextEncoderConfig};
pub use weights::{WeightConfig, RATING_WEIGHT};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus is empty: no recipes to build features from")]
    Empty,

    #[error("missing column in source data: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value {value:?} in column {column} at row {row}")]
    InvalidRecord {
        row: usize,
        column: String,
        value: String,
    },

    #[error("cache artifacts are inconsistent: {0}")]
    Cache(String),

    #[error("no cached artifacts in {0:?} and no CSV dataset configured")]
    NoSource(std::path::PathBuf),

    #[error("invalid corpus weights: {0} must be a non-negative number")]
    InvalidWeight(&'static str),
}

/// Everything fitted on the corpus that is needed to encode a query into the
/// same column space as the feature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedEncoders {
    pub ingredients: TextEncoder,
    pub keywords: TextEncoder,
    pub keywords_name: TextEncoder,
    pub categories: CategoryVocabulary,
    pub scalers: NumericScalers,
}

impl FittedEncoders {
    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout {
            ingredients: self.ingredients.width(),
            category: self.categories.width(),
            keywords: self.keywords.width(),
            keywords_name: self.keywords_name.width(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    recipes: Vec<Recipe>,
    encoders: FittedEncoders,
    matrix: FeatureMatrix,
    max_calories: f64,
    max_time: f64,
}

fn join_terms(terms: &[String]) -> String {
    terms.join(" ")
}

impl Corpus {
    /// Fits all encoders on `recipes` and builds the weighted feature matrix.
    pub fn build(recipes: Vec<Recipe>, weights: &WeightConfig) -> Result<Self, CorpusError> {
        if recipes.is_empty() {
            return Err(CorpusError::Empty);
        }
        if let Some(field) = weights.invalid_field() {
            return Err(CorpusError::InvalidWeight(field));
        }

        let ingredient_docs: Vec<String> =
            recipes.iter().map(|r| join_terms(&r.ingredients)).collect();
        let keyword_docs: Vec<String> = recipes.iter().map(|r| join_terms(&r.keywords)).collect();
        let keyword_name_docs: Vec<String> = recipes
            .iter()
            .map(|r| join_terms(&r.keywords_name))
            .collect();

        let calories: Vec<f64> = recipes.iter().map(|r| r.calories).collect();
        let times: Vec<f64> = recipes
            .iter()
            .map(|r| r.total_time_minutes as f64)
            .collect();
        let ratings: Vec<f64> = recipes.iter().map(|r| r.rating).collect();

        let scalers = NumericScalers {
            calories: MinMaxScaler::fit(&calories).ok_or(CorpusError::Empty)?,
            time: MinMaxScaler::fit(&times).ok_or(CorpusError::Empty)?,
            rating: MinMaxScaler::fit(&ratings).ok_or(CorpusError::Empty)?,
        };

        let encoders = FittedEncoders {
            ingredients: TextEncoder::fit(&ingredient_docs, TextEncoderConfig::INGREDIENTS),
            keywords: TextEncoder::fit(&keyword_docs, TextEncoderConfig::KEYWORDS),
            keywords_name: TextEncoder::fit(&keyword_name_docs, TextEncoderConfig::KEYWORDS),
            categories: CategoryVocabulary::fit(recipes.iter().map(|r| r.category.as_str())),
            scalers,
        };
        let layout = encoders.layout();

        let mut matrix = FeatureMatrix::new(layout.width());
        for (i, recipe) in recipes.iter().enumerate() {
            let mut row = RowBuilder::new();
            row.block(
                layout.ingredients_offset(),
                &encoders.ingredients.transform(&ingredient_docs[i]),
                weights.ingredients,
            );
            if let Some(column) = encoders.categories.column_of(&recipe.category) {
                row.value(layout.category_offset() + column, weights.category);
            }
            for flag in DietaryFlag::ALL {
                if recipe.dietary.get(flag) {
                    row.value(layout.dietary_offset() + flag.index(), weights.dietary);
                }
            }
            row.value(
                layout.calories_offset(),
                scalers.calories.transform(recipe.calories) * weights.calories,
            )
            .value(
                layout.time_offset(),
                scalers.time.transform(recipe.total_time_minutes as f64) * weights.time,
            )
            .block(
                layout.keywords_offset(),
                &encoders.keywords.transform(&keyword_docs[i]),
                weights.keywords,
            )
            .block(
                layout.keywords_name_offset(),
                &encoders.keywords_name.transform(&keyword_name_docs[i]),
                weights.keywords_name,
            )
            .value(
                layout.rating_offset(),
                scalers.rating.transform(recipe.rating) * RATING_WEIGHT,
            );
            matrix.push_row(row.finish());
        }

        info!(
            "Built feature matrix: {} recipes x {} columns ({} non-zero)",
            matrix.n_rows(),
            matrix.n_cols(),
            matrix.nnz()
        );

        Self::from_parts(recipes, encoders, matrix)
    }

    /// Assembles a corpus from previously built parts, checking that they
    /// agree with each other.
    pub fn from_parts(
        recipes: Vec<Recipe>,
        encoders: FittedEncoders,
        matrix: FeatureMatrix,
    ) -> Result<Self, CorpusError> {
        if recipes.is_empty() {
            return Err(CorpusError::Empty);
        }
        if !matrix.is_well_formed() {
            return Err(CorpusError::Cache("feature matrix is malformed".to_string()));
        }
        if matrix.n_rows() != recipes.len() {
            return Err(CorpusError::Cache(format!(
                "feature matrix has {} rows but there are {} recipes",
                matrix.n_rows(),
                recipes.len()
            )));
        }
        let expected_cols = encoders.layout().width();
        if matrix.n_cols() != expected_cols {
            return Err(CorpusError::Cache(format!(
                "feature matrix has {} columns but the encoders produce {}",
                matrix.n_cols(),
                expected_cols
            )));
        }

        let max_calories = recipes
            .iter()
            .map(|r| r.calories)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_time = recipes
            .iter()
            .map(|r| r.total_time_minutes as f64)
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            recipes,
            encoders,
            matrix,
            max_calories,
            max_time,
        })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn encoders(&self) -> &FittedEncoders {
        &self.encoders
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    pub fn layout(&self) -> FeatureLayout {
        self.encoders.layout()
    }

    /// Largest calorie count in the corpus.
    pub fn max_calories(&self) -> f64 {
        self.max_calories
    }

    /// Largest total time (minutes) in the corpus.
    pub fn max_time(&self) -> f64 {
        self.max_time
    }
}
