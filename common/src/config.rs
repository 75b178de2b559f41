use crate::llm::ModelConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = ".sqlgen";
pub const SCHEMA_FILE: &str = "schemas.json";
pub const CACHE_FILE: &str = "cache.json";

/// resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub model: ModelConfig,
    pub max_attempts: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from("."),
            model: ModelConfig::default(),
            max_attempts: 2,
        }
    }
}

impl Settings {
    /// fill unset values from the defaults
    pub fn resolve(
        data_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        model: Option<String>,
        api_base: Option<String>,
        timeout_secs: Option<u64>,
        max_attempts: Option<usize>,
    ) -> Self {
        let defaults = Self::default();

        let mut model_config = defaults.model;
        if let Some(model) = model.filter(|s| !s.is_empty()) {
            model_config.model = model;
        }
        if let Some(api_base) = api_base.filter(|s| !s.is_empty()) {
            model_config.api_base = api_base;
        }
        if let Some(secs) = timeout_secs {
            model_config.timeout = Duration::from_secs(secs.max(1));
        }

        Self {
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            output_dir: output_dir.unwrap_or(defaults.output_dir),
            model: model_config,
            max_attempts: max_attempts.unwrap_or(defaults.max_attempts).max(1),
        }
    }

    pub fn schema_path(&self) -> PathBuf {
        self.data_dir.join(SCHEMA_FILE)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
