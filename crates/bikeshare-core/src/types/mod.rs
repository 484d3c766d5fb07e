//! # Core Type Definitions
//!
//! This module contains all core types for the Bikeshare trip pipeline:
//! - City identifiers and data availability (`CityKey`, `CityAvailability`)
//! - Trip representation (`TripRecord`)
//! - Filter selection (`FilterSpec`)
//! - Error types (`BikeshareError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Derive their calendar fields exactly once, at construction
//! - Implement `Ord` where they are used as `BTreeMap` keys
//! - Are immutable once handed to the filter engine

use crate::calendar::Calendar;
use crate::primitives::ALL_SELECTOR;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CITY IDENTIFIERS
// =============================================================================

/// Key of a supported city. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityKey {
    Chicago,
    NewYorkCity,
    Washington,
}

impl CityKey {
    /// Every supported city, in catalog order.
    pub const ALL: [CityKey; 3] = [CityKey::Chicago, CityKey::NewYorkCity, CityKey::Washington];

    /// Machine key, as used in configuration files and on the command line.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            CityKey::Chicago => "chicago",
            CityKey::NewYorkCity => "new_york_city",
            CityKey::Washington => "washington",
        }
    }

    /// Human-readable city name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            CityKey::Chicago => "Chicago",
            CityKey::NewYorkCity => "New York City",
            CityKey::Washington => "Washington",
        }
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CityKey {
    type Err = BikeshareError;

    /// Parse a city key, case-insensitively.
    ///
    /// Spaces and hyphens are read as underscores, so `New York City`,
    /// `new-york-city` and `new_york_city` all name the same city.
    /// The run-together form `newyorkcity` is accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();

        match normalized.as_str() {
            "chicago" => Ok(CityKey::Chicago),
            "new_york_city" | "newyorkcity" => Ok(CityKey::NewYorkCity),
            "washington" => Ok(CityKey::Washington),
            _ => Err(BikeshareError::UnknownCity(s.trim().to_string())),
        }
    }
}

// =============================================================================
// CITY AVAILABILITY
// =============================================================================

/// Which optional fields a city's data source provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityAvailability {
    /// Whether gender and birth-year columns exist for this city.
    pub demographics: bool,
}

impl CityAvailability {
    /// Availability for a city that records gender and birth year.
    #[must_use]
    pub const fn with_demographics() -> Self {
        Self { demographics: true }
    }

    /// Availability for a city without demographic columns.
    #[must_use]
    pub const fn without_demographics() -> Self {
        Self {
            demographics: false,
        }
    }

    #[must_use]
    pub const fn has_demographics(&self) -> bool {
        self.demographics
    }
}

// =============================================================================
// TRIP RECORD
// =============================================================================

/// One bikeshare trip.
///
/// `month` and `weekday` are derived from `start_time` when the record is
/// built and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    /// When the trip started.
    pub start_time: NaiveDateTime,
    /// End timestamp exactly as it appears in the source; not used by aggregation.
    pub end_time: String,
    /// `None` when the source cell is empty.
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    /// Trip duration in seconds, never negative; `None` when the source cell
    /// is empty.
    pub trip_duration_seconds: Option<f64>,
    /// Rider category (e.g. "Subscriber"); `None` when the source cell is empty.
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    month: u32,
    weekday: Weekday,
}

impl TripRecord {
    /// Create a fully populated trip and derive its calendar fields.
    #[must_use]
    pub fn new(
        start_time: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        trip_duration_seconds: f64,
        user_type: Option<String>,
    ) -> Self {
        Self::from_parts(
            start_time,
            Some(start_station.into()),
            Some(end_station.into()),
            Some(trip_duration_seconds),
            user_type,
        )
    }

    /// Create a trip whose station and duration cells may be blank.
    #[must_use]
    pub fn from_parts(
        start_time: NaiveDateTime,
        start_station: Option<String>,
        end_station: Option<String>,
        trip_duration_seconds: Option<f64>,
        user_type: Option<String>,
    ) -> Self {
        Self {
            start_time,
            end_time: String::new(),
            start_station,
            end_station,
            trip_duration_seconds,
            user_type,
            gender: None,
            birth_year: None,
            month: start_time.month(),
            weekday: start_time.weekday(),
        }
    }

    /// Attach the raw end timestamp.
    #[must_use]
    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = end_time.into();
        self
    }

    /// Attach demographic fields.
    #[must_use]
    pub fn with_demographics(mut self, gender: Option<String>, birth_year: Option<i32>) -> Self {
        self.gender = gender;
        self.birth_year = birth_year;
        self
    }

    /// Calendar month of the start time (1 = January).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Weekday of the start time.
    #[must_use]
    pub const fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Full English weekday name of the start time (e.g. "Monday").
    #[must_use]
    pub fn weekday_name(&self) -> &'static str {
        Calendar::english().weekday_name(self.weekday)
    }

    /// Hour of the start time (0-23).
    #[must_use]
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }
}

// =============================================================================
// FILTER SPEC
// =============================================================================

/// The month and weekday selectors for one analysis pass.
///
/// Both selectors are stored trimmed and lowercased; `"all"` disables the
/// corresponding filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub month: String,
    pub day: String,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::all()
    }
}

impl FilterSpec {
    /// A filter that keeps every record.
    #[must_use]
    pub fn all() -> Self {
        Self {
            month: ALL_SELECTOR.to_string(),
            day: ALL_SELECTOR.to_string(),
        }
    }

    /// Build a filter without validating the selectors.
    ///
    /// The filter engine rejects names it cannot resolve with
    /// `BikeshareError::InvalidFilter`.
    #[must_use]
    pub fn new(month: impl AsRef<str>, day: impl AsRef<str>) -> Self {
        Self {
            month: month.as_ref().trim().to_lowercase(),
            day: day.as_ref().trim().to_lowercase(),
        }
    }

    /// Build a filter from user input, rejecting anything outside the
    /// supported months and the seven weekdays.
    ///
    /// Returns `BikeshareError::Validation` naming the offending selector.
    pub fn validated(
        month: impl AsRef<str>,
        day: impl AsRef<str>,
        calendar: &Calendar,
    ) -> Result<Self, BikeshareError> {
        let spec = Self::new(month, day);

        if !spec.month_is_all() {
            let supported = calendar
                .month_number(&spec.month)
                .is_some_and(|m| calendar.is_supported_month(m));
            if !supported {
                return Err(BikeshareError::Validation(format!(
                    "month '{}' is not one of: all, {}",
                    spec.month,
                    calendar.supported_month_names().collect::<Vec<_>>().join(", ")
                )));
            }
        }

        if !spec.day_is_all() && calendar.weekday(&spec.day).is_none() {
            return Err(BikeshareError::Validation(format!(
                "day '{}' is not one of: all, {}",
                spec.day,
                calendar.weekday_names().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(spec)
    }

    #[must_use]
    pub fn month_is_all(&self) -> bool {
        self.month == ALL_SELECTOR
    }

    #[must_use]
    pub fn day_is_all(&self) -> bool {
        self.day == ALL_SELECTOR
    }

    /// True when neither selector narrows the dataset.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.month_is_all() && self.day_is_all()
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month={}, day={}", self.month, self.day)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Bikeshare pipeline.
///
/// - No silent failures
/// - Empty views are NOT errors; the aggregator reports them as `NoData`
/// - The pipeline should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum BikeshareError {
    /// The city key is outside the supported set or missing from the catalog.
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// User input was rejected before reaching the pipeline.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A filter selector reached the engine that it cannot resolve.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The backing data source is missing, unreadable or malformed.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// The configuration file is unreadable or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A terminal I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
