//! Recipe Recommender Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod category_match;
pub mod config;
pub mod corpus;
pub mod extraction;
pub mod images;
pub mod recommend;
pub mod server;

// Re-export commonly used types for convenience
pub use corpus::{load_or_build, Corpus, CorpusError, Recipe, WeightConfig};
pub use recommend::{RecipeQuery, RecommendationService, RecommendedRecipe};
pub use server::{run_server, RequestsLoggingLevel};
