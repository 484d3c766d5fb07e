//! # Aggregator
//!
//! Descriptive statistics over a [`ScopedView`].
//!
//! Four independent groups: travel times, stations, trip duration and
//! users. Each operation is a pure function of its inputs and may be called
//! any number of times, in any order.
//!
//! ## Tie-break
//!
//! "Most common" is the value with the highest count. On equal counts the
//! lowest value wins: numeric order for months, hours and years, Monday
//! first for weekdays, byte order for strings. Counting goes through a
//! `BTreeMap`, so the first maximum seen in key order is the winner.
//!
//! ## Missing results
//!
//! Nothing is defaulted. A statistic with no input rows is
//! [`Reported::NoData`]; a statistic the city's data cannot provide is
//! [`Reported::Unavailable`].

use crate::calendar::Calendar;
use crate::filter::ScopedView;
use crate::primitives::STATION_PAIR_SEPARATOR;
use crate::{CityAvailability, CityKey, FilterSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// RESULT MARKERS
// =============================================================================

/// Outcome of one statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reported<T> {
    /// The statistic was computed.
    Value(T),
    /// The view had no rows to compute it from.
    NoData,
    /// The city's data does not carry the needed field.
    Unavailable,
}

impl<T> Reported<T> {
    /// The computed value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Reported::Value(v) => Some(v),
            Reported::NoData | Reported::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Reported::NoData)
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Reported::Unavailable)
    }

    /// Transform the computed value, keeping the markers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reported<U> {
        match self {
            Reported::Value(v) => Reported::Value(f(v)),
            Reported::NoData => Reported::NoData,
            Reported::Unavailable => Reported::Unavailable,
        }
    }
}

/// A most-common value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode<T> {
    pub value: T,
    pub count: usize,
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

// =============================================================================
// STATISTIC GROUPS
// =============================================================================

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStats {
    /// Month name, e.g. "June".
    pub most_common_month: Reported<Mode<String>>,
    /// Weekday name, e.g. "Wednesday".
    pub most_common_day: Reported<Mode<String>>,
    /// Start hour, 0-23.
    pub most_common_start_hour: Reported<Mode<u32>>,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationStats {
    pub most_common_start_station: Reported<Mode<String>>,
    pub most_common_end_station: Reported<Mode<String>>,
    /// Direction-sensitive `start - end` pair.
    pub most_common_trip: Reported<Mode<String>>,
}

/// Total and average trip duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub trip_count: usize,
    /// Trips with a recorded duration; the mean divides by this.
    pub timed_trip_count: usize,
    /// Zero when no trip has a duration.
    pub total_seconds: f64,
    /// `NoData` when no trip has a duration.
    pub mean_seconds: Reported<f64>,
}

/// Earliest, most recent and most common birth year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: Mode<i32>,
}

/// Rider breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Sorted by count descending, then value ascending.
    pub user_types: Reported<Vec<FrequencyEntry>>,
    /// Same ordering as `user_types`.
    pub genders: Reported<Vec<FrequencyEntry>>,
    pub birth_years: Reported<BirthYearStats>,
}

/// All four groups for one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub city: CityKey,
    pub filter: FilterSpec,
    pub trip_count: usize,
    pub time: TimeStats,
    pub station: StationStats,
    pub duration: DurationStats,
    pub user: UserStats,
}

impl Report {
    /// Assemble a report from the four groups computed over `view`.
    #[must_use]
    pub fn new(
        view: &ScopedView,
        filter: &FilterSpec,
        time: TimeStats,
        station: StationStats,
        duration: DurationStats,
        user: UserStats,
    ) -> Self {
        Self {
            city: view.city(),
            filter: filter.clone(),
            trip_count: view.len(),
            time,
            station,
            duration,
            user,
        }
    }
}

// =============================================================================
// COUNTING HELPERS
// =============================================================================

/// Most frequent key; lowest key on ties.
fn mode<K: Ord>(values: impl IntoIterator<Item = K>) -> Reported<Mode<K>> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<Mode<K>> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|b| count > b.count) {
            best = Some(Mode { value, count });
        }
    }

    best.map_or(Reported::NoData, Reported::Value)
}

/// Full frequency table, count descending then value ascending.
fn frequency_table<'a>(values: impl IntoIterator<Item = &'a str>) -> Reported<Vec<FrequencyEntry>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return Reported::NoData;
    }

    let mut table: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(value, count)| FrequencyEntry {
            value: value.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap's ascending value order within equal counts.
    table.sort_by(|a, b| b.count.cmp(&a.count));
    Reported::Value(table)
}

// =============================================================================
// AGGREGATOR
// =============================================================================

/// Computes statistic groups over scoped views.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    calendar: Calendar,
}

impl Aggregator {
    #[must_use]
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    /// Most common month, weekday and start hour.
    #[must_use]
    pub fn time_stats(&self, view: &ScopedView) -> TimeStats {
        let month = mode(view.iter().map(|r| r.month()));
        let day = mode(view.iter().map(|r| r.weekday().num_days_from_monday()));
        let hour = mode(view.iter().map(|r| r.start_hour()));

        let calendar = self.calendar;
        TimeStats {
            most_common_month: month.map(|m| Mode {
                value: calendar.month_name(m.value).unwrap_or_default().to_string(),
                count: m.count,
            }),
            most_common_day: day.map(|d| Mode {
                value: calendar
                    .weekday_name_from_monday(d.value)
                    .unwrap_or_default()
                    .to_string(),
                count: d.count,
            }),
            most_common_start_hour: hour,
        }
    }

    /// Most common start station, end station and directed trip.
    ///
    /// Blank stations are skipped; a trip pair needs both ends.
    #[must_use]
    pub fn station_stats(&self, view: &ScopedView) -> StationStats {
        StationStats {
            most_common_start_station: mode(view.iter().filter_map(|r| r.start_station.as_deref()))
                .map(owned),
            most_common_end_station: mode(view.iter().filter_map(|r| r.end_station.as_deref()))
                .map(owned),
            most_common_trip: mode(view.iter().filter_map(|r| {
                match (&r.start_station, &r.end_station) {
                    (Some(start), Some(end)) => {
                        Some(format!("{}{}{}", start, STATION_PAIR_SEPARATOR, end))
                    }
                    _ => None,
                }
            })),
        }
    }

    /// Total and mean trip duration over trips that have one.
    #[must_use]
    pub fn duration_stats(&self, view: &ScopedView) -> DurationStats {
        let durations: Vec<f64> = view.iter().filter_map(|r| r.trip_duration_seconds).collect();
        let total_seconds: f64 = durations.iter().sum();
        let mean_seconds = if durations.is_empty() {
            Reported::NoData
        } else {
            Reported::Value(total_seconds / durations.len() as f64)
        };

        DurationStats {
            trip_count: view.len(),
            timed_trip_count: durations.len(),
            total_seconds,
            mean_seconds,
        }
    }

    /// User-type table and, where the city has them, gender and birth-year
    /// statistics. Rows missing a field are left out of that field's
    /// statistic only.
    #[must_use]
    pub fn user_stats(&self, view: &ScopedView, availability: CityAvailability) -> UserStats {
        let user_types = frequency_table(view.iter().filter_map(|r| r.user_type.as_deref()));

        if !availability.has_demographics() {
            return UserStats {
                user_types,
                genders: Reported::Unavailable,
                birth_years: Reported::Unavailable,
            };
        }

        let genders = frequency_table(view.iter().filter_map(|r| r.gender.as_deref()));

        let years: Vec<i32> = view.iter().filter_map(|r| r.birth_year).collect();
        let birth_years = match (years.iter().min(), years.iter().max()) {
            (Some(&earliest), Some(&most_recent)) => mode(years.iter().copied()).map(|m| {
                BirthYearStats {
                    earliest,
                    most_recent,
                    most_common: m,
                }
            }),
            _ => Reported::NoData,
        };

        UserStats {
            user_types,
            genders,
            birth_years,
        }
    }

    /// Run all four groups.
    #[must_use]
    pub fn report(&self, view: &ScopedView, filter: &FilterSpec) -> Report {
        Report::new(
            view,
            filter,
            self.time_stats(view),
            self.station_stats(view),
            self.duration_stats(view),
            self.user_stats(view, view.availability()),
        )
    }
}

fn owned(m: Mode<&str>) -> Mode<String> {
    Mode {
        value: m.value.to_string(),
        count: m.count,
    }
}

// =============================================================================
// TESTS
// =============================================================================
