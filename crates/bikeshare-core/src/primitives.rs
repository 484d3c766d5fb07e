//! # Pipeline Primitives
//!
//! Hardcoded runtime constants for the Bikeshare pipeline.
//!
//! These are compiled into the binary and are immutable at runtime.
//! Name tables live in [`crate::calendar`]; the city table lives in
//! [`crate::catalog`].

/// Selector value that disables a month or weekday filter.
pub const ALL_SELECTOR: &str = "all";

/// Number of raw records returned per pagination request.
pub const PAGE_SIZE: usize = 5;

/// The single timestamp format accepted for `Start Time`.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator joining start and end station into a station pair.
///
/// A pair is direction-sensitive: `A - B` and `B - A` are different trips.
pub const STATION_PAIR_SEPARATOR: &str = " - ";

/// Highest month (1-based) covered by the published trip data.
///
/// The source files only span January through June.
pub const LAST_SUPPORTED_MONTH: u32 = 6;
