//! # Configuration
//!
//! Optional TOML configuration for the explorer.
//!
//! ```toml
//! data_dir = "/srv/bikeshare"
//!
//! [cities.new_york_city]
//! file = "nyc_2017.csv"
//!
//! [cities.washington]
//! demographics = false
//! ```
//!
//! ## Precedence (data directory)
//!
//! 1. `--data-dir` flag
//! 2. `BIKESHARE_DATA_DIR` environment variable
//! 3. `data_dir` in the configuration file
//! 4. The current directory

use bikeshare_core::{BikeshareError, CityCatalog, CityKey, CitySource};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "BIKESHARE_DATA_DIR";

/// Maximum configuration file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Per-city overrides; unset fields keep the standard catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CityOverride {
    pub file: Option<PathBuf>,
    pub demographics: Option<bool>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Keyed by city key (`chicago`, `new_york_city`, `washington`).
    #[serde(default)]
    pub cities: BTreeMap<String, CityOverride>,
}

impl AppConfig {
    /// Parse configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, BikeshareError> {
        let config: Self =
            toml::from_str(text).map_err(|e| BikeshareError::Config(e.to_string()))?;

        // Reject typos in city keys up front rather than silently ignoring them.
        for key in config.cities.keys() {
            key.parse::<CityKey>()
                .map_err(|_| BikeshareError::Config(format!("unknown city '{}'", key)))?;
        }
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, BikeshareError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            BikeshareError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(BikeshareError::Config(format!(
                "'{}' is {} bytes, larger than the {} byte limit",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            BikeshareError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, BikeshareError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// The standard catalog with this configuration's overrides applied.
    pub fn catalog(&self) -> Result<CityCatalog, BikeshareError> {
        let mut catalog = CityCatalog::standard();
        for (key, city_override) in &self.cities {
            let city: CityKey = key
                .parse()
                .map_err(|_| BikeshareError::Config(format!("unknown city '{}'", key)))?;
            let base = catalog.source(city)?.clone();

            let mut availability = base.availability;
            if let Some(demographics) = city_override.demographics {
                availability.demographics = demographics;
            }
            let file = city_override.file.clone().unwrap_or(base.file);

            catalog = catalog.with_source(city, CitySource::new(file, availability));
        }
        Ok(catalog)
    }

    /// Pick the data directory by precedence.
    #[must_use]
    pub fn resolve_data_dir(&self, flag: Option<&Path>, env_value: Option<String>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
