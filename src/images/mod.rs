//! Image resolution for recommended recipes.

mod coordinator;
mod placeholder;
mod provider;
pub mod providers;
mod refs;
mod transport;

pub use coordinator::{
    CoordinatorConfig, ImageResolutionCoordinator, ImageSession, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_SEARCH_DEADLINE,
};
pub use placeholder::{PlaceholderPool, DEFAULT_PLACEHOLDERS};
pub use provider::{ImageProvider, ProviderError};
pub use refs::extract_image_urls;
pub use transport::Transport;
