//! # City Catalog
//!
//! The table of supported cities: which file backs each one and which
//! optional columns it carries.
//!
//! The catalog is built once at startup (from defaults or a configuration
//! file) and injected into the record store.

use crate::{BikeshareError, CityAvailability, CityKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Backing source for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySource {
    /// File name, relative to the data directory unless absolute.
    pub file: PathBuf,
    /// Optional columns present in the file.
    pub availability: CityAvailability,
}

impl CitySource {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, availability: CityAvailability) -> Self {
        Self {
            file: file.into(),
            availability,
        }
    }
}

/// Immutable mapping from city key to its source.
///
/// Uses BTreeMap so listings come out in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCatalog {
    entries: BTreeMap<CityKey, CitySource>,
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl CityCatalog {
    /// The published dataset layout: one CSV per city, Washington without
    /// gender or birth year.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_source(
                CityKey::Chicago,
                CitySource::new("chicago.csv", CityAvailability::with_demographics()),
            )
            .with_source(
                CityKey::NewYorkCity,
                CitySource::new("new_york_city.csv", CityAvailability::with_demographics()),
            )
            .with_source(
                CityKey::Washington,
                CitySource::new("washington.csv", CityAvailability::without_demographics()),
            )
    }

    /// A catalog with no cities.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the source for a city.
    #[must_use]
    pub fn with_source(mut self, city: CityKey, source: CitySource) -> Self {
        self.entries.insert(city, source);
        self
    }

    /// Look up a city's source.
    ///
    /// Returns `BikeshareError::UnknownCity` if the catalog has no entry.
    pub fn source(&self, city: CityKey) -> Result<&CitySource, BikeshareError> {
        self.entries
            .get(&city)
            .ok_or_else(|| BikeshareError::UnknownCity(city.key().to_string()))
    }

    pub fn availability(&self, city: CityKey) -> Result<CityAvailability, BikeshareError> {
        self.source(city).map(|s| s.availability)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (CityKey, &CitySource)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
