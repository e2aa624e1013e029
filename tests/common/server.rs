//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own dataset and artifact cache.

use super::constants::*;
use super::fixtures::create_test_dataset;
use recipe_recommender::corpus::load_or_build;
use recipe_recommender::extraction::{AttributeExtractor, ImageDescriber};
use recipe_recommender::images::{CoordinatorConfig, ImageResolutionCoordinator, PlaceholderPool};
use recipe_recommender::recommend::{RecommendationService, DEFAULT_IMAGES_PER_RECIPE};
use recipe_recommender::server::{make_app, RequestsLoggingLevel, ServerConfig};
use recipe_recommender::WeightConfig;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated dataset
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    // Private fields - keep resources alive until drop
    _temp_dataset_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server without attribute extraction.
    pub async fn spawn() -> Self {
        Self::spawn_with_extractor(None).await
    }

    /// Spawns a server with text extraction but no photo description.
    pub async fn spawn_with_extractor(extractor: Option<Arc<dyn AttributeExtractor>>) -> Self {
        Self::spawn_with_analysis(extractor, None).await
    }

    /// Spawns a new test server on a random port
    ///
    /// The corpus is built from the fixture CSV and no image providers are
    /// registered, so recipes without known images get placeholders.
    ///
    /// # Panics
    ///
    /// Panics if the dataset cannot be created, the port cannot be bound,
    /// or the server doesn't become ready within the timeout.
    pub async fn spawn_with_analysis(
        extractor: Option<Arc<dyn AttributeExtractor>>,
        describer: Option<Arc<dyn ImageDescriber>>,
    ) -> Self {
        let (temp_dataset_dir, csv_path, form_data_path) =
            create_test_dataset().expect("Failed to create test dataset");
        let cache_dir = temp_dataset_dir.path().join("precomputed");

        let corpus = load_or_build(Some(csv_path.as_path()), &cache_dir, &WeightConfig::default())
            .expect("Failed to build corpus");

        let coordinator = ImageResolutionCoordinator::new(
            vec![],
            CoordinatorConfig {
                search_deadline: Duration::from_millis(IMAGE_SEARCH_DEADLINE_MS),
                http_timeout: Duration::from_secs(1),
                placeholders: PlaceholderPool::default(),
            },
        );
        let service = Arc::new(RecommendationService::new(
            Arc::new(corpus),
            Arc::new(coordinator),
            WeightConfig::default(),
            DEFAULT_IMAGES_PER_RECIPE,
        ));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            metrics_port: 0,
            allowed_origin: None,
            form_data_path: Some(form_data_path),
        };

        let app = make_app(config, service, extractor, describer, "test".to_string())
            .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _temp_dataset_dir: temp_dataset_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/api/health", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
