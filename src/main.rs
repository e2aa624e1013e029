use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recipe_recommender::config::{AppConfig, CliConfig, FileConfig};
use recipe_recommender::corpus::load_or_build;
use recipe_recommender::extraction::{
    AttributeExtractor, ImageDescriber, OpenAiExtractor, OpenAiImageDescriber,
};
use recipe_recommender::images::providers::build_providers;
use recipe_recommender::images::{CoordinatorConfig, ImageResolutionCoordinator, PlaceholderPool};
use recipe_recommender::recommend::RecommendationService;
use recipe_recommender::server::{self, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the recipe dataset CSV. Optional when the cache directory
    /// already holds precomputed artifacts.
    #[clap(long, value_parser = parse_path)]
    pub csv_path: Option<PathBuf>,

    /// Directory holding the precomputed corpus artifacts.
    #[clap(long, value_parser = parse_path, default_value = "precomputed")]
    pub cache_dir: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 7860)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Shared deadline in seconds for one image provider fan-out.
    #[clap(long, default_value_t = 60)]
    pub image_search_timeout_sec: u64,

    /// Timeout in seconds for each outgoing HTTP request.
    #[clap(long, default_value_t = 60)]
    pub http_timeout_sec: u64,

    /// The only origin allowed by CORS. Any origin when omitted.
    #[clap(long)]
    pub allowed_origin: Option<String>,

    /// JSON file served by /api/form-data.
    #[clap(long, value_parser = parse_path)]
    pub form_data_path: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            csv_path: self.csv_path.clone(),
            cache_dir: self.cache_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            image_search_timeout_sec: self.image_search_timeout_sec,
            http_timeout_sec: self.http_timeout_sec,
            allowed_origin: self.allowed_origin.clone(),
            form_data_path: self.form_data_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!("Loading corpus (cache at {:?})...", config.cache_dir);
    let corpus = load_or_build(config.csv_path.as_deref(), &config.cache_dir, &config.weights)
        .context("Failed to load the recipe corpus")?;
    server::metrics::set_corpus_recipes(corpus.len());

    let providers = build_providers(config.images.providers.as_slice())
        .map_err(|name| anyhow::anyhow!("Unknown image provider '{}'", name))?;
    let placeholders = match &config.images.placeholders {
        Some(urls) => PlaceholderPool::new(urls.iter().cloned()),
        None => PlaceholderPool::default(),
    };
    let coordinator = ImageResolutionCoordinator::new(
        providers,
        CoordinatorConfig {
            search_deadline: config.image_search_deadline,
            http_timeout: config.http_timeout,
            placeholders,
        },
    );
    info!(
        "Image providers: {:?}, deadline {:?}",
        coordinator.provider_names(),
        config.image_search_deadline
    );

    let service = Arc::new(RecommendationService::new(
        Arc::new(corpus),
        Arc::new(coordinator),
        config.weights,
        config.images.images_per_recipe,
    ));

    let (extractor, describer): (
        Option<Arc<dyn AttributeExtractor>>,
        Option<Arc<dyn ImageDescriber>>,
    ) = match &config.extraction {
        Some(settings) => {
            let api_key = settings.api_key();
            if api_key.is_none() {
                warn!(
                    "No API key in ${}, extraction requests are sent unauthenticated",
                    settings.api_key_env
                );
            }
            info!(
                "Attribute extraction via {} ({}, images with {})",
                settings.base_url, settings.model, settings.vision_model
            );
            let extractor = OpenAiExtractor::new(
                settings.base_url.clone(),
                settings.model.clone(),
                api_key.clone(),
                settings.timeout,
            );
            let describer = OpenAiImageDescriber::new(
                settings.base_url.clone(),
                settings.vision_model.clone(),
                api_key,
                settings.timeout,
            );
            (
                Some(Arc::new(extractor) as Arc<dyn AttributeExtractor>),
                Some(Arc::new(describer) as Arc<dyn ImageDescriber>),
            )
        }
        None => {
            info!("Attribute extraction not configured");
            (None, None)
        }
    };

    run_server(config.server_config(), service, extractor, describer).await
}
