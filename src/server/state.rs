use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::extraction::{AttributeExtractor, ImageDescriber};
use crate::recommend::RecommendationService;

use super::ServerConfig;

pub type GuardedRecommendationService = Arc<RecommendationService>;
pub type OptionalExtractor = Option<Arc<dyn AttributeExtractor>>;
pub type OptionalDescriber = Option<Arc<dyn ImageDescriber>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub service: GuardedRecommendationService,
    pub extractor: OptionalExtractor,
    pub describer: OptionalDescriber,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedRecommendationService {
    fn from_ref(input: &ServerState) -> Self {
        input.service.clone()
    }
}

impl FromRef<ServerState> for OptionalExtractor {
    fn from_ref(input: &ServerState) -> Self {
        input.extractor.clone()
    }
}

impl FromRef<ServerState> for OptionalDescriber {
    fn from_ref(input: &ServerState) -> Self {
        input.describer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
