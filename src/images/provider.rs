use async_trait::async_trait;
use thiserror::Error;

use super::transport::Transport;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("failed to scan HTML: {0}")]
    Html(String),
}

/// An independent source of candidate image URLs for a recipe name.
///
/// Implementations may fail or hang; the coordinator bounds every call with
/// its own deadline and treats failures as empty results.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short stable name used in logs, metrics and configuration.
    fn name(&self) -> &str;

    async fn search(
        &self,
        transport: &Transport,
        recipe_name: &str,
        max_count: usize,
    ) -> Result<Vec<String>, ProviderError>;
}
