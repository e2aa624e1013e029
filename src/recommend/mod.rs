//! Feature-weighted similarity ranking of the corpus against a query.

mod encoder;
mod query;
mod ranker;
mod service;

pub use crate::corpus::WeightConfig;
pub use encoder::{QueryEncoder, QueryVector};
pub use query::{QueryError, RecipeQuery, RecommendationRequest, DEFAULT_TOP_N};
pub use ranker::{RankingOptions, ScoredRecipe, SimilarityRanker};
pub use service::{RecommendationService, RecommendedRecipe, DEFAULT_IMAGES_PER_RECIPE};
