//! Concrete image providers and their registry.

mod allrecipes;
mod food_com;
mod food_network;
mod google;
mod wikimedia;

pub use allrecipes::AllRecipesProvider;
pub use food_com::FoodComProvider;
pub use food_network::FoodNetworkProvider;
pub use google::GoogleImagesProvider;
pub use wikimedia::WikimediaProvider;

use std::borrow::Cow;
use std::sync::Arc;

use lol_html::{ElementContentHandlers, HtmlRewriter, OutputSink, Selector, Settings};

use super::provider::{ImageProvider, ProviderError};

/// Provider names in default registration order.
pub const PROVIDER_NAMES: [&str; 5] = [
    GoogleImagesProvider::NAME,
    FoodNetworkProvider::NAME,
    AllRecipesProvider::NAME,
    WikimediaProvider::NAME,
    FoodComProvider::NAME,
];

pub fn provider_by_name(name: &str) -> Option<Arc<dyn ImageProvider>> {
    let provider: Arc<dyn ImageProvider> = match name {
        GoogleImagesProvider::NAME => Arc::new(GoogleImagesProvider),
        FoodNetworkProvider::NAME => Arc::new(FoodNetworkProvider),
        AllRecipesProvider::NAME => Arc::new(AllRecipesProvider),
        WikimediaProvider::NAME => Arc::new(WikimediaProvider),
        FoodComProvider::NAME => Arc::new(FoodComProvider),
        _ => return None,
    };
    Some(provider)
}

/// Builds providers for `names`, in order. Unknown names are returned as
/// the error.
pub fn build_providers<S: AsRef<str>>(names: &[S]) -> Result<Vec<Arc<dyn ImageProvider>>, String> {
    names
        .iter()
        .map(|name| provider_by_name(name.as_ref()).ok_or_else(|| name.as_ref().to_string()))
        .collect()
}

// =============================================================================
// HTML scanning
// =============================================================================

type Handler<'h> = (Cow<'h, Selector>, ElementContentHandlers<'h>);

struct NoopSink;

impl OutputSink for NoopSink {
    fn handle_chunk(&mut self, _chunk: &[u8]) {}
}

/// Runs `html` through the given content handlers without producing output.
fn scan_html(html: &str, handlers: Vec<Handler<'_>>) -> Result<(), ProviderError> {
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        NoopSink,
    );
    rewriter
        .write(html.as_bytes())
        .map_err(|e| ProviderError::Html(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| ProviderError::Html(e.to_string()))
}

fn rejects_any(url: &str, markers: &[&str]) -> bool {
    let lowered = url.to_lowercase();
    markers.iter().any(|m| lowered.contains(m))
}
