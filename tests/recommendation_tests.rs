//! Library-level tests for corpus caching, ranking and image resolution
//!
//! These run without an HTTP server and use in-process image providers.

mod common;

use async_trait::async_trait;
use common::{
    create_test_dataset, names, BUFFALO_WINGS_NAME, FIXTURE_RECIPE_COUNT, LEMON_CHICKEN_IMAGE,
    LEMON_CHICKEN_NAME, MATCHA_LATTE_NAME,
};
use recipe_recommender::corpus::{load_or_build, ArtifactCache, CorpusError};
use recipe_recommender::images::{
    CoordinatorConfig, ImageProvider, ImageResolutionCoordinator, PlaceholderPool, ProviderError,
    Transport,
};
use recipe_recommender::recommend::{RecommendationRequest, RecommendationService};
use recipe_recommender::{Corpus, WeightConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct StaticProvider {
    name: &'static str,
    urls: Vec<&'static str>,
    delay: Duration,
}

impl StaticProvider {
    fn new(name: &'static str, urls: Vec<&'static str>) -> Self {
        Self {
            name,
            urls,
            delay: Duration::ZERO,
        }
    }

    fn slow(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            urls: vec!["https://slow.example/never.jpg"],
            delay,
        }
    }
}

#[async_trait]
impl ImageProvider for StaticProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(
        &self,
        _transport: &Transport,
        _recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(self
            .urls
            .iter()
            .take(max_count)
            .map(|u| u.to_string())
            .collect())
    }
}

struct BrokenProvider;

#[async_trait]
impl ImageProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    async fn search(
        &self,
        _transport: &Transport,
        _recipe_name: &str,
        _max_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::Status(503))
    }
}

fn coordinator(providers: Vec<Arc<dyn ImageProvider>>) -> ImageResolutionCoordinator {
    ImageResolutionCoordinator::new(
        providers,
        CoordinatorConfig {
            search_deadline: Duration::from_millis(300),
            http_timeout: Duration::from_secs(1),
            placeholders: PlaceholderPool::new(["https://placeholder.example/1.jpg".to_string()]),
        },
    )
}

fn build_corpus() -> (tempfile::TempDir, Corpus) {
    let (dir, csv_path, _) = create_test_dataset().unwrap();
    let corpus = load_or_build(
        Some(csv_path.as_path()),
        &dir.path().join("precomputed"),
        &WeightConfig::default(),
    )
    .unwrap();
    (dir, corpus)
}

#[test]
fn test_missing_values_are_filled_with_column_medians() {
    let (_dir, corpus) = build_corpus();
    assert_eq!(corpus.len(), FIXTURE_RECIPE_COUNT);

    let latte = corpus
        .recipes()
        .iter()
        .find(|r| r.name == MATCHA_LATTE_NAME)
        .unwrap();
    assert_eq!(latte.calories, 520.0);
    assert_eq!(latte.rating, 4.5);
    assert_eq!(latte.review_count, 25);
}

#[test]
fn test_cached_corpus_matches_built_corpus() {
    let (dir, csv_path, _) = create_test_dataset().unwrap();
    let cache_dir = dir.path().join("precomputed");

    let built = load_or_build(Some(csv_path.as_path()), &cache_dir, &WeightConfig::default())
        .unwrap();
    assert!(ArtifactCache::new(&cache_dir).is_complete());

    let cached = load_or_build(None, &cache_dir, &WeightConfig::default()).unwrap();
    assert_eq!(cached.recipes(), built.recipes());
    assert_eq!(cached.layout(), built.layout());
    assert_eq!(cached.max_calories(), built.max_calories());
}

#[test]
fn test_no_source_without_cache_or_csv() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = load_or_build(None, &dir.path().join("precomputed"), &WeightConfig::default());
    assert!(matches!(result, Err(CorpusError::NoSource(_))));
}

#[tokio::test]
async fn test_known_refs_skip_providers() {
    let provider = StaticProvider::new("static", vec!["https://static.example/a.jpg"]);
    let coordinator = coordinator(vec![Arc::new(provider)]);

    let images = coordinator
        .resolve(LEMON_CHICKEN_NAME, &format!(r#"c("{}")"#, LEMON_CHICKEN_IMAGE), 3)
        .await;
    assert_eq!(images, vec![LEMON_CHICKEN_IMAGE]);
}

#[tokio::test]
async fn test_provider_results_merge_in_registration_order() {
    let coordinator = coordinator(vec![
        Arc::new(BrokenProvider),
        Arc::new(StaticProvider::new(
            "first",
            vec!["https://first.example/a.jpg", "https://shared.example/b.jpg"],
        )),
        Arc::new(StaticProvider::new(
            "second",
            vec!["https://shared.example/b.jpg", "https://second.example/c.jpg"],
        )),
    ]);

    let images = coordinator.resolve(BUFFALO_WINGS_NAME, "NA", 3).await;
    assert_eq!(
        images,
        vec![
            "https://first.example/a.jpg",
            "https://shared.example/b.jpg",
            "https://second.example/c.jpg",
        ]
    );
}

#[tokio::test]
async fn test_slow_provider_is_cut_off_by_shared_deadline() {
    let coordinator = coordinator(vec![
        Arc::new(StaticProvider::slow("slow", Duration::from_secs(10))),
        Arc::new(StaticProvider::new("fast", vec!["https://fast.example/a.jpg"])),
    ]);

    let started = Instant::now();
    let images = coordinator.resolve(BUFFALO_WINGS_NAME, "NA", 3).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(images, vec!["https://fast.example/a.jpg"]);
}

#[tokio::test]
async fn test_placeholders_when_every_provider_fails() {
    let coordinator = coordinator(vec![Arc::new(BrokenProvider)]);

    let images = coordinator.resolve(BUFFALO_WINGS_NAME, "NA", 3).await;
    assert_eq!(images, vec!["https://placeholder.example/1.jpg"]);
}

#[tokio::test]
async fn test_service_attaches_provider_images() {
    let (_dir, corpus) = build_corpus();
    let images = coordinator(vec![Arc::new(StaticProvider::new(
        "static",
        vec!["https://static.example/wings.jpg"],
    ))]);
    let service = RecommendationService::new(
        Arc::new(corpus),
        Arc::new(images),
        WeightConfig::default(),
        2,
    );

    let request: RecommendationRequest =
        serde_json::from_value(json!({"category": "chicken", "calories": 300, "time": 40}))
            .unwrap();
    let results = service.recommend(&request.validate().unwrap()).await;

    let records: Vec<serde_json::Value> = results
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();
    assert_eq!(names(&records), vec![LEMON_CHICKEN_NAME, BUFFALO_WINGS_NAME]);
    assert_eq!(results[0].images, vec![LEMON_CHICKEN_IMAGE]);
    assert_eq!(results[1].images, vec!["https://static.example/wings.jpg"]);
}
