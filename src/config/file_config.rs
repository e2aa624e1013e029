use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::corpus::WeightConfig;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub csv_path: Option<String>,
    pub cache_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub image_search_timeout_sec: Option<u64>,
    pub http_timeout_sec: Option<u64>,
    pub allowed_origin: Option<String>,
    pub form_data_path: Option<String>,

    // Feature configs
    pub weights: Option<WeightConfig>,
    pub images: Option<ImagesConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ImagesConfig {
    /// Provider names in registration order.
    pub providers: Option<Vec<String>>,
    pub images_per_recipe: Option<usize>,
    pub placeholders: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ExtractionConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Vision-capable model used to describe food photos. Defaults to `model`.
    pub vision_model: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
