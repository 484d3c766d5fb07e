//! # Record Store
//!
//! Loads one city's trip data into an immutable [`Dataset`].
//!
//! - Every start time is parsed with one format ([`START_TIME_FORMAT`])
//! - Month and weekday are derived once, when the record is built
//! - A single unparseable row rejects the whole load; rows are never skipped
//!
//! ## Sources
//!
//! The store is reached through the [`TripSource`] trait:
//! - `CsvDirectory`: one CSV file per city under a data directory
//! - `InMemorySource`: CSV text held in memory (tests, embedding)

use crate::catalog::CityCatalog;
use crate::primitives::START_TIME_FORMAT;
use crate::{BikeshareError, CityAvailability, CityKey, TripRecord};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

// =============================================================================
// COLUMN CONTRACT
// =============================================================================

/// Columns every city file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Start Time",
    "End Time",
    "Trip Duration",
    "Start Station",
    "End Station",
    "User Type",
];

/// Columns that cities with demographics must additionally provide.
pub const DEMOGRAPHIC_COLUMNS: [&str; 2] = ["Gender", "Birth Year"];

/// One row as it appears in the CSV, before parsing.
///
/// Unknown columns (such as the unnamed index column) are ignored. Empty
/// cells other than the start time come through as `None`.
#[derive(Debug, Deserialize)]
struct RawTripRow {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration", default)]
    trip_duration: Option<f64>,
    #[serde(rename = "Start Station", default)]
    start_station: Option<String>,
    #[serde(rename = "End Station", default)]
    end_station: Option<String>,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

// =============================================================================
// DATASET
// =============================================================================

/// The full, ordered trip sequence for one city.
///
/// Read-only after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    city: CityKey,
    availability: CityAvailability,
    records: Vec<TripRecord>,
}

impl Dataset {
    /// Wrap already-parsed records.
    ///
    /// Demographic fields are cleared when `availability` has none, so a
    /// city without demographics never carries them.
    #[must_use]
    pub fn from_records(
        city: CityKey,
        availability: CityAvailability,
        mut records: Vec<TripRecord>,
    ) -> Self {
        if !availability.has_demographics() {
            for record in &mut records {
                record.gender = None;
                record.birth_year = None;
            }
        }
        Self {
            city,
            availability,
            records,
        }
    }

    /// Parse a city's CSV from any reader.
    ///
    /// # Errors
    /// Returns `BikeshareError::DataLoad` if:
    /// - A required column (or a demographic column, for cities that have
    ///   demographics) is missing from the header
    /// - Any row fails to deserialize or has an unparseable start time
    /// - Any present trip duration is negative or not finite
    ///
    /// Blank duration, station, user-type and demographic cells are kept as
    /// `None` and left out of the statistics that need them.
    /// - Any birth year is not a whole number
    pub fn from_reader<R: Read>(
        city: CityKey,
        availability: CityAvailability,
        reader: R,
    ) -> Result<Self, BikeshareError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| BikeshareError::DataLoad(format!("{}: unreadable header: {}", city, e)))?
            .clone();

        let mut expected: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        if availability.has_demographics() {
            expected.extend(DEMOGRAPHIC_COLUMNS);
        }
        if let Some(missing) = expected
            .iter()
            .copied()
            .find(|column| !headers.iter().any(|h| h == *column))
        {
            return Err(BikeshareError::DataLoad(format!(
                "{}: missing column '{}'",
                city, missing
            )));
        }

        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<RawTripRow>().enumerate() {
            let row_number = index + 1;
            let raw = row.map_err(|e| {
                BikeshareError::DataLoad(format!("{}: row {}: {}", city, row_number, e))
            })?;
            records.push(parse_row(raw, availability).map_err(|reason| {
                BikeshareError::DataLoad(format!("{}: row {}: {}", city, row_number, reason))
            })?);
        }

        Ok(Self::from_records(city, availability, records))
    }

    #[must_use]
    pub fn city(&self) -> CityKey {
        self.city
    }

    #[must_use]
    pub fn availability(&self) -> CityAvailability {
        self.availability
    }

    /// All records, in source order.
    #[must_use]
    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TripRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turn a raw row into a record. Errors are plain reasons; the caller adds
/// the city and row number.
fn parse_row(raw: RawTripRow, availability: CityAvailability) -> Result<TripRecord, String> {
    let start_time = NaiveDateTime::parse_from_str(&raw.start_time, START_TIME_FORMAT)
        .map_err(|e| format!("invalid start time '{}': {}", raw.start_time, e))?;

    if let Some(duration) = raw
        .trip_duration
        .filter(|d| !d.is_finite() || *d < 0.0)
    {
        return Err(format!("invalid trip duration {}", duration));
    }

    let birth_year = match raw.birth_year {
        Some(year) if availability.has_demographics() => Some(whole_year(year)?),
        _ => None,
    };
    let gender = raw.gender.filter(|_| availability.has_demographics());

    Ok(TripRecord::from_parts(
        start_time,
        raw.start_station,
        raw.end_station,
        raw.trip_duration,
        raw.user_type,
    )
    .with_end_time(raw.end_time)
    .with_demographics(gender, birth_year))
}

/// Birth years are stored as floats in some exports ("1992.0").
fn whole_year(year: f64) -> Result<i32, String> {
    if !year.is_finite() || year.fract() != 0.0 || year.abs() > f64::from(i32::MAX) {
        return Err(format!("invalid birth year {}", year));
    }
    Ok(year as i32)
}

// =============================================================================
// TRIP SOURCE TRAIT
// =============================================================================

/// Where datasets come from.
///
/// Implementations must not cache: every `load` reads the source afresh, so a
/// restarted session never observes a previous pass.
pub trait TripSource {
    /// The city table this source serves.
    fn catalog(&self) -> &CityCatalog;

    /// Load and parse one city's dataset.
    fn load(&self, city: CityKey) -> Result<Dataset, BikeshareError>;
}

// =============================================================================
// CSV DIRECTORY
// =============================================================================

/// City files on disk under a single data directory.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    data_dir: PathBuf,
    catalog: CityCatalog,
}

impl CsvDirectory {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, catalog: CityCatalog) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog,
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolve the file backing a city.
    pub fn path_for(&self, city: CityKey) -> Result<PathBuf, BikeshareError> {
        let source = self.catalog.source(city)?;
        if source.file.is_absolute() {
            Ok(source.file.clone())
        } else {
            Ok(self.data_dir.join(&source.file))
        }
    }
}

impl TripSource for CsvDirectory {
    fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    fn load(&self, city: CityKey) -> Result<Dataset, BikeshareError> {
        let availability = self.catalog.availability(city)?;
        let path = self.path_for(city)?;
        let file = File::open(&path).map_err(|e| {
            BikeshareError::DataLoad(format!("cannot open '{}': {}", path.display(), e))
        })?;
        Dataset::from_reader(city, availability, file)
    }
}

// =============================================================================
// IN-MEMORY SOURCE
// =============================================================================

/// CSV text per city, held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    catalog: CityCatalog,
    sources: BTreeMap<CityKey, String>,
}

impl InMemorySource {
    #[must_use]
    pub fn new(catalog: CityCatalog) -> Self {
        Self {
            catalog,
            sources: BTreeMap::new(),
        }
    }

    /// Register the CSV text for a city.
    #[must_use]
    pub fn with_csv(mut self, city: CityKey, csv_text: impl Into<String>) -> Self {
        self.sources.insert(city, csv_text.into());
        self
    }
}

impl TripSource for InMemorySource {
    fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    fn load(&self, city: CityKey) -> Result<Dataset, BikeshareError> {
        let availability = self.catalog.availability(city)?;
        let text = self.sources.get(&city).ok_or_else(|| {
            BikeshareError::DataLoad(format!("no data registered for {}", city))
        })?;
        Dataset::from_reader(city, availability, text.as_bytes())
    }
}

// =============================================================================
// TESTS
// =============================================================================
