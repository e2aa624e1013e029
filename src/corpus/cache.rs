//! On-disk cache of the fitted corpus artifacts.
//!
//! The cache directory holds one JSON file per artifact. It is used only when
//! every artifact is present; otherwise the corpus is rebuilt from the raw
//! dataset and the full set is written again. The feature matrix is written
//! last so an interrupted write leaves an incomplete (and therefore ignored)
//! set behind.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use super::ingest::load_recipes_csv;
use super::{Corpus, CorpusError, FittedEncoders, WeightConfig};

const RECIPES_FILE: &str = "recipes.json";
const INGREDIENTS_ENCODER_FILE: &str = "ingredients_encoder.json";
const KEYWORDS_ENCODER_FILE: &str = "keywords_encoder.json";
const KEYWORDS_NAME_ENCODER_FILE: &str = "keywords_name_encoder.json";
const CATEGORIES_FILE: &str = "categories.json";
const SCALERS_FILE: &str = "scalers.json";
const MATRIX_FILE: &str = "feature_matrix.json";

const ARTIFACT_FILES: [&str; 7] = [
    RECIPES_FILE,
    INGREDIENTS_ENCODER_FILE,
    KEYWORDS_ENCODER_FILE,
    KEYWORDS_NAME_ENCODER_FILE,
    CATEGORIES_FILE,
    SCALERS_FILE,
    MATRIX_FILE,
];

pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True when every artifact file exists.
    pub fn is_complete(&self) -> bool {
        ARTIFACT_FILES.iter().all(|f| self.dir.join(f).is_file())
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, CorpusError> {
        let reader = BufReader::new(File::open(self.dir.join(file))?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), CorpusError> {
        let mut writer = BufWriter::new(File::create(self.dir.join(file))?);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(&self) -> Result<Corpus, CorpusError> {
        let encoders = FittedEncoders {
            ingredients: self.read(INGREDIENTS_ENCODER_FILE)?,
            keywords: self.read(KEYWORDS_ENCODER_FILE)?,
            keywords_name: self.read(KEYWORDS_NAME_ENCODER_FILE)?,
            categories: self.read(CATEGORIES_FILE)?,
            scalers: self.read(SCALERS_FILE)?,
        };
        Corpus::from_parts(self.read(RECIPES_FILE)?, encoders, self.read(MATRIX_FILE)?)
    }

    pub fn store(&self, corpus: &Corpus) -> Result<(), CorpusError> {
        std::fs::create_dir_all(&self.dir)?;
        let encoders = corpus.encoders();
        self.write(RECIPES_FILE, &corpus.recipes())?;
        self.write(INGREDIENTS_ENCODER_FILE, &encoders.ingredients)?;
        self.write(KEYWORDS_ENCODER_FILE, &encoders.keywords)?;
        self.write(KEYWORDS_NAME_ENCODER_FILE, &encoders.keywords_name)?;
        self.write(CATEGORIES_FILE, &encoders.categories)?;
        self.write(SCALERS_FILE, &encoders.scalers)?;
        self.write(MATRIX_FILE, corpus.matrix())?;
        Ok(())
    }
}

/// Loads the corpus from `cache_dir` when the artifact set is complete,
/// otherwise builds it from `csv_path` with `weights` and persists it.
///
/// Cached artifacts are used as they are: `weights` only affect a rebuild.
pub fn load_or_build(
    csv_path: Option<&Path>,
    cache_dir: &Path,
    weights: &WeightConfig,
) -> Result<Corpus, CorpusError> {
    let cache = ArtifactCache::new(cache_dir);
    let start = Instant::now();

    if cache.is_complete() {
        let corpus = cache.load()?;
        info!(
            "Loaded {} recipes from cache {:?} in {:?}",
            corpus.len(),
            cache_dir,
            start.elapsed()
        );
        return Ok(corpus);
    }

    let csv_path = csv_path.ok_or_else(|| CorpusError::NoSource(cache_dir.to_path_buf()))?;
    info!("Cache {:?} incomplete, building corpus from {:?}", cache_dir, csv_path);
    let corpus = Corpus::build(load_recipes_csv(csv_path)?, weights)?;
    if let Err(err) = cache.store(&corpus) {
        warn!("Failed to persist corpus artifacts to {:?}: {}", cache_dir, err);
    }
    info!(
        "Built corpus of {} recipes in {:?}",
        corpus.len(),
        start.elapsed()
    );
    Ok(corpus)
}
