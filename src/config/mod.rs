mod file_config;

pub use file_config::{ExtractionConfig, FileConfig, ImagesConfig};

use crate::corpus::{ArtifactCache, WeightConfig};
use crate::images::providers::PROVIDER_NAMES;
use crate::images::{DEFAULT_HTTP_TIMEOUT, DEFAULT_SEARCH_DEADLINE};
use crate::recommend::DEFAULT_IMAGES_PER_RECIPE;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXTRACTION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EXTRACTION_API_KEY_ENV: &str = "EXTRACTION_API_KEY";
const DEFAULT_EXTRACTION_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub csv_path: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub image_search_timeout_sec: u64,
    pub http_timeout_sec: u64,
    pub allowed_origin: Option<String>,
    pub form_data_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub csv_path: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub image_search_deadline: Duration,
    pub http_timeout: Duration,
    pub allowed_origin: Option<String>,
    pub form_data_path: Option<PathBuf>,

    // Feature configs (with defaults)
    pub weights: WeightConfig,
    pub images: ImageSettings,
    pub extraction: Option<ExtractionSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    pub providers: Vec<String>,
    pub images_per_recipe: usize,
    /// Replaces the built-in placeholder pool when set.
    pub placeholders: Option<Vec<String>>,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            providers: PROVIDER_NAMES.iter().map(|s| s.to_string()).collect(),
            images_per_recipe: DEFAULT_IMAGES_PER_RECIPE,
            placeholders: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSettings {
    pub base_url: String,
    pub model: String,
    pub vision_model: String,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl ExtractionSettings {
    fn from_file(file: ExtractionConfig) -> Self {
        let model = file
            .model
            .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string());
        Self {
            base_url: file
                .base_url
                .unwrap_or_else(|| DEFAULT_EXTRACTION_BASE_URL.to_string()),
            vision_model: file.vision_model.unwrap_or_else(|| model.clone()),
            model,
            api_key_env: file
                .api_key_env
                .unwrap_or_else(|| DEFAULT_EXTRACTION_API_KEY_ENV.to_string()),
            timeout: Duration::from_secs(
                file.timeout_sec.unwrap_or(DEFAULT_EXTRACTION_TIMEOUT_SEC),
            ),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Zero means "use the default".
fn seconds_or(value: u64, default: Duration) -> Duration {
    match value {
        0 => default,
        secs => Duration::from_secs(secs),
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let csv_path = file
            .csv_path
            .map(PathBuf::from)
            .or_else(|| cli.csv_path.clone());
        let cache_dir = file
            .cache_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.cache_dir.clone());

        match &csv_path {
            Some(path) if !path.is_file() => bail!("CSV file does not exist: {:?}", path),
            Some(_) => {}
            None => {
                if !ArtifactCache::new(&cache_dir).is_complete() {
                    bail!(
                        "csv_path must be specified via --csv-path or in config file \
                         when {:?} holds no precomputed artifacts",
                        cache_dir
                    );
                }
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let image_search_deadline = seconds_or(
            file.image_search_timeout_sec
                .unwrap_or(cli.image_search_timeout_sec),
            DEFAULT_SEARCH_DEADLINE,
        );
        let http_timeout = seconds_or(
            file.http_timeout_sec.unwrap_or(cli.http_timeout_sec),
            DEFAULT_HTTP_TIMEOUT,
        );

        let allowed_origin = file
            .allowed_origin
            .or_else(|| cli.allowed_origin.clone());
        let form_data_path = file
            .form_data_path
            .map(PathBuf::from)
            .or_else(|| cli.form_data_path.clone());

        let weights = file.weights.unwrap_or_default();
        if let Some(field) = weights.invalid_field() {
            bail!("Weight {} must be a non-negative number", field);
        }

        // Image settings - merge file config with defaults
        let images_file = file.images.unwrap_or_default();
        let defaults = ImageSettings::default();
        let images = ImageSettings {
            providers: images_file.providers.unwrap_or(defaults.providers),
            images_per_recipe: images_file
                .images_per_recipe
                .unwrap_or(defaults.images_per_recipe),
            placeholders: images_file.placeholders,
        };
        if images.images_per_recipe == 0 {
            bail!("images_per_recipe must be greater than zero");
        }
        if let Some(unknown) = images
            .providers
            .iter()
            .find(|name| !PROVIDER_NAMES.contains(&name.as_str()))
        {
            bail!(
                "Unknown image provider '{}', expected one of {:?}",
                unknown,
                PROVIDER_NAMES
            );
        }
        if images.placeholders.as_ref().is_some_and(|p| p.is_empty()) {
            bail!("placeholders must not be empty when set");
        }

        let extraction = file.extraction.map(ExtractionSettings::from_file);

        Ok(Self {
            csv_path,
            cache_dir,
            port,
            metrics_port,
            logging_level,
            image_search_deadline,
            http_timeout,
            allowed_origin,
            form_data_path,
            weights,
            images,
            extraction,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            allowed_origin: self.allowed_origin.clone(),
            form_data_path: self.form_data_path.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
