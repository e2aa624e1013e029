//! Orchestrates query encoding, ranking and image resolution.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::{Corpus, Recipe, WeightConfig};
use crate::images::ImageResolutionCoordinator;
use crate::server::metrics;

use super::encoder::QueryEncoder;
use super::query::RecipeQuery;
use super::ranker::{RankingOptions, SimilarityRanker};

pub const DEFAULT_IMAGES_PER_RECIPE: usize = 3;

/// A recommended recipe as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedRecipe {
    #[serde(rename = "RecipeId")]
    pub recipe_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RecipeCategory")]
    pub category: String,
    #[serde(rename = "RecipeIngredientParts")]
    pub ingredients: Vec<String>,
    #[serde(rename = "Keywords")]
    pub keywords: Vec<String>,
    pub keywords_name: Vec<String>,
    #[serde(rename = "Calories")]
    pub calories: f64,
    #[serde(rename = "TotalTime_minutes")]
    pub total_time_minutes: i64,
    #[serde(rename = "AggregatedRating")]
    pub rating: f64,
    #[serde(rename = "ReviewCount")]
    pub review_count: i64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "RecipeIngredientQuantities")]
    pub ingredient_quantities: Vec<String>,
    #[serde(rename = "RecipeInstructions")]
    pub instructions: Vec<String>,
    #[serde(rename = "Images")]
    pub images: Vec<String>,
    #[serde(rename = "Similarity")]
    pub similarity: f64,
}

impl RecommendedRecipe {
    fn new(recipe: &Recipe, images: Vec<String>, similarity: f64) -> Self {
        Self {
            recipe_id: recipe.id,
            name: recipe.name.clone(),
            category: recipe.category.clone(),
            ingredients: recipe.ingredients.clone(),
            keywords: recipe.keywords.clone(),
            keywords_name: recipe.keywords_name.clone(),
            calories: recipe.calories,
            total_time_minutes: recipe.total_time_minutes,
            rating: recipe.rating,
            review_count: recipe.review_count,
            description: recipe.description.clone(),
            ingredient_quantities: recipe.ingredient_quantities.clone(),
            instructions: recipe.instructions.clone(),
            images,
            similarity,
        }
    }
}

pub struct RecommendationService {
    corpus: Arc<Corpus>,
    images: Arc<ImageResolutionCoordinator>,
    default_weights: WeightConfig,
    images_per_recipe: usize,
}

impl RecommendationService {
    pub fn new(
        corpus: Arc<Corpus>,
        images: Arc<ImageResolutionCoordinator>,
        default_weights: WeightConfig,
        images_per_recipe: usize,
    ) -> Self {
        Self {
            corpus,
            images,
            default_weights,
            images_per_recipe,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn default_weights(&self) -> &WeightConfig {
        &self.default_weights
    }

    /// Ranks the corpus against `query` and resolves images for the winners.
    ///
    /// Weights come from the query when it carries its own, otherwise from
    /// the service defaults. Candidates are resolved one at a time within a
    /// single image session.
    pub async fn recommend(&self, query: &RecipeQuery) -> Vec<RecommendedRecipe> {
        let started = Instant::now();
        let weights = query.weights.unwrap_or(self.default_weights);
        info!(
            "Recommending up to {} recipes for category {:?}, dietary {:?}",
            query.top_n, query.category, query.dietary
        );

        let vector = QueryEncoder::new(&self.corpus).encode(query, &weights);
        let options = RankingOptions {
            target_calories: query.calories.map(|c| c as f64),
            target_time: query.time.map(|t| t as f64),
            category: query.category.as_deref(),
        };
        let ranked = SimilarityRanker::new(&self.corpus).rank(&vector, &options, query.top_n);

        let recipes = self.corpus.recipes();
        let session = self.images.open_session();
        let mut results = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let recipe = &recipes[candidate.index];
            let images = session
                .resolve(&recipe.name, &recipe.image_refs, self.images_per_recipe)
                .await;
            results.push(RecommendedRecipe::new(recipe, images, candidate.score));
        }
        drop(session);

        metrics::record_recommendation(results.len(), started.elapsed());
        info!(
            "Returning {} recommendations in {:?}",
            results.len(),
            started.elapsed()
        );
        results
    }
}
