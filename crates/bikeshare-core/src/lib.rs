//! # bikeshare-core
//!
//! The deterministic trip-analysis pipeline for Bikeshare - THE PIPELINE.
//!
//! This crate turns raw, time-stamped bikeshare trip rows into correctly
//! scoped subsets and summary statistics:
//! - `store`: load one city's CSV into an immutable `Dataset`
//! - `filter`: narrow a dataset by month and weekday into a `ScopedView`
//! - `aggregate`: time, station, duration and user statistics
//! - `session`: sequence a pass and paginate raw records
//!
//! ## Architectural Constraints
//!
//! The pipeline:
//! - Never prompts, prints or logs; callers own all I/O
//! - Is deterministic: explicit tie-breaks, `BTreeMap` counting
//! - Treats datasets and views as immutable once produced
//! - Reports empty or unavailable statistics as values, not errors

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregate;
pub mod calendar;
pub mod catalog;
pub mod filter;
pub mod primitives;
pub mod session;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{BikeshareError, CityAvailability, CityKey, FilterSpec, TripRecord};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use aggregate::{
    Aggregator, BirthYearStats, DurationStats, FrequencyEntry, Mode, Report, Reported,
    StationStats, TimeStats, UserStats,
};
pub use calendar::Calendar;
pub use catalog::{CityCatalog, CitySource};
pub use filter::{FilterEngine, ScopedView};
pub use session::{
    AnalysisPass, GroupTimings, Page, PageSignal, RawPager, Session, SessionRequest,
};
pub use store::{CsvDirectory, Dataset, InMemorySource, TripSource};
