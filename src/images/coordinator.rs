//! Resolves representative images for a recipe.
//!
//! Known image references stored with the recipe are reused as they are.
//! Otherwise every registered provider is queried concurrently under one
//! shared deadline; providers still running when it expires are dropped.
//! Results are merged in registration order and deduplicated. When nothing
//! is found the placeholder pool is used, so resolution never fails.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::server::metrics;

use super::placeholder::PlaceholderPool;
use super::provider::ImageProvider;
use super::refs::extract_image_urls;
use super::transport::Transport;

pub const DEFAULT_SEARCH_DEADLINE: Duration = Duration::from_secs(60);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Shared deadline for one provider fan-out.
    pub search_deadline: Duration,
    /// Timeout of every individual HTTP request made by providers.
    pub http_timeout: Duration,
    pub placeholders: PlaceholderPool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            search_deadline: DEFAULT_SEARCH_DEADLINE,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            placeholders: PlaceholderPool::default(),
        }
    }
}

pub struct ImageResolutionCoordinator {
    providers: Vec<Arc<dyn ImageProvider>>,
    config: CoordinatorConfig,
}

impl ImageResolutionCoordinator {
    /// `providers` are queried, and their results merged, in this order.
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>, config: CoordinatorConfig) -> Self {
        Self { providers, config }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Acquires the transport shared by all lookups made through the
    /// returned session. It is released when the session is dropped.
    pub fn open_session(&self) -> ImageSession<'_> {
        let transport = match Transport::new(self.config.http_timeout) {
            Ok(transport) => Some(transport),
            Err(err) => {
                warn!("Could not create image transport, using placeholders: {}", err);
                None
            }
        };
        debug!("Image session opened");
        ImageSession {
            coordinator: self,
            transport,
        }
    }

    /// One-off resolution in its own session.
    pub async fn resolve(
        &self,
        recipe_name: &str,
        known_refs: &str,
        requested_count: usize,
    ) -> Vec<String> {
        self.open_session()
            .resolve(recipe_name, known_refs, requested_count)
            .await
    }
}

/// Scope of one transport acquisition, usually one recommendation request.
pub struct ImageSession<'c> {
    coordinator: &'c ImageResolutionCoordinator,
    transport: Option<Transport>,
}

impl ImageSession<'_> {
    /// Up to `requested_count` unique image URLs for a recipe.
    pub async fn resolve(
        &self,
        recipe_name: &str,
        known_refs: &str,
        requested_count: usize,
    ) -> Vec<String> {
        if requested_count == 0 {
            return Vec::new();
        }

        let known = unique_urls(extract_image_urls(known_refs), requested_count);
        if !known.is_empty() {
            debug!("Reusing {} known image URLs for '{}'", known.len(), recipe_name);
            metrics::record_image_resolution("reused");
            return known;
        }

        if let Some(transport) = &self.transport {
            let found = self.fan_out(transport, recipe_name, requested_count).await;
            if !found.is_empty() {
                info!("Found {} images for '{}'", found.len(), recipe_name);
                metrics::record_image_resolution("providers");
                return found;
            }
        }

        info!("No images found for '{}', using placeholders", recipe_name);
        metrics::record_image_resolution("placeholder");
        self.coordinator.config.placeholders.pick(requested_count)
    }

    async fn fan_out(
        &self,
        transport: &Transport,
        recipe_name: &str,
        requested_count: usize,
    ) -> Vec<String> {
        let deadline = Instant::now() + self.coordinator.config.search_deadline;

        let searches = self.coordinator.providers.iter().map(|provider| async move {
            let name = provider.name();
            let started = Instant::now();
            let outcome = timeout_at(
                deadline,
                provider.search(transport, recipe_name, requested_count),
            )
            .await;
            match outcome {
                Ok(Ok(urls)) => {
                    debug!(
                        provider = name,
                        count = urls.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Provider finished"
                    );
                    let label = if urls.is_empty() { "empty" } else { "ok" };
                    metrics::record_image_provider_result(name, label);
                    urls
                }
                Ok(Err(err)) => {
                    warn!(provider = name, "Image search for '{}' failed: {}", recipe_name, err);
                    metrics::record_image_provider_result(name, "error");
                    Vec::new()
                }
                Err(_) => {
                    warn!(provider = name, "Image search for '{}' cancelled at deadline", recipe_name);
                    metrics::record_image_provider_result(name, "timeout");
                    Vec::new()
                }
            }
        });

        unique_urls(join_all(searches).await.into_iter().flatten(), requested_count)
    }
}

/// First `limit` distinct URLs, in first-seen order.
fn unique_urls(urls: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .take(limit)
        .collect()
}

impl Drop for ImageSession<'_> {
    fn drop(&mut self) {
        debug!("Image session closed");
    }
}
