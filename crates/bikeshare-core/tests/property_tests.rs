//! # Property-Based Tests
//!
//! Filter and aggregation invariants checked with proptest.

use bikeshare_core::{
    Aggregator, Calendar, CityAvailability, CityKey, Dataset, FilterEngine, FilterSpec, Reported,
    TripRecord,
};
use chrono::NaiveDate;
use proptest::collection::vec;
use proptest::prelude::*;
use std::sync::Arc;

const STATIONS: [&str; 4] = ["Adams", "Belmont", "Clark", "Damen"];
const USER_TYPES: [&str; 3] = ["Customer", "Dependent", "Subscriber"];

/// (month, day, hour, start, end, duration, user type)
type RawTrip = (u32, u32, u32, usize, usize, u32, usize);

fn raw_trip() -> impl Strategy<Value = RawTrip> {
    (
        1u32..=6,
        1u32..=28,
        0u32..24,
        0usize..STATIONS.len(),
        0usize..STATIONS.len(),
        0u32..10_000,
        0usize..USER_TYPES.len(),
    )
}

fn build(trips: &[RawTrip]) -> Arc<Dataset> {
    let records = trips
        .iter()
        .map(|&(month, day, hour, start, end, duration, user)| {
            let start_time = NaiveDate::from_ymd_opt(2017, month, day)
                .and_then(|d| d.and_hms_opt(hour, 0, 0))
                .expect("valid timestamp");
            TripRecord::new(
                start_time,
                STATIONS[start],
                STATIONS[end],
                f64::from(duration),
                Some(USER_TYPES[user].to_string()),
            )
        })
        .collect();
    Arc::new(Dataset::from_records(
        CityKey::Chicago,
        CityAvailability::with_demographics(),
        records,
    ))
}

fn selector(names: Vec<String>) -> impl Strategy<Value = String> {
    let mut options = vec!["all".to_string()];
    options.extend(names);
    proptest::sample::select(options)
}

fn month_selector() -> impl Strategy<Value = String> {
    selector(Calendar::english().supported_month_names().collect())
}

fn day_selector() -> impl Strategy<Value = String> {
    selector(Calendar::english().weekday_names().collect())
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Filtering a filtered view with the same filter changes nothing.
    #[test]
    fn filter_is_idempotent(
        trips in vec(raw_trip(), 0..60),
        month in month_selector(),
        day in day_selector(),
    ) {
        let engine = FilterEngine::default();
        let spec = FilterSpec::new(month, day);
        let once = engine.apply(&build(&trips), &spec).expect("once");
        let twice = engine.refine(&once, &spec).expect("twice");
        prop_assert_eq!(once.row_indices(), twice.row_indices());
    }

    /// all/all returns every row in original order.
    #[test]
    fn unfiltered_is_identity(trips in vec(raw_trip(), 0..60)) {
        let view = FilterEngine::default()
            .apply(&build(&trips), &FilterSpec::all())
            .expect("apply");
        let expected: Vec<usize> = (0..trips.len()).collect();
        prop_assert_eq!(view.row_indices(), expected.as_slice());
    }

    /// Every surviving row matches both selectors; rows stay ascending.
    #[test]
    fn view_rows_match_spec(
        trips in vec(raw_trip(), 0..60),
        month in month_selector(),
        day in day_selector(),
    ) {
        let calendar = Calendar::english();
        let spec = FilterSpec::new(&month, &day);
        let view = FilterEngine::new(calendar).apply(&build(&trips), &spec).expect("apply");

        for record in view.iter() {
            if !spec.month_is_all() {
                prop_assert_eq!(Some(record.month()), calendar.month_number(&month));
            }
            if !spec.day_is_all() {
                prop_assert!(record.weekday_name().eq_ignore_ascii_case(&day));
            }
        }
        prop_assert!(view.row_indices().windows(2).all(|w| w[0] < w[1]));
    }

    /// Mean times count reproduces the total.
    #[test]
    fn mean_consistent_with_total(trips in vec(raw_trip(), 1..60)) {
        let view = FilterEngine::default()
            .apply(&build(&trips), &FilterSpec::all())
            .expect("apply");
        let stats = Aggregator::default().duration_stats(&view);
        let Reported::Value(mean) = stats.mean_seconds else {
            return Err(TestCaseError::fail("non-empty view must have a mean"));
        };
        prop_assert!((mean * stats.timed_trip_count as f64 - stats.total_seconds).abs() < 1e-6);
    }

    /// The user-type table accounts for every row and is sorted.
    #[test]
    fn user_table_complete_and_sorted(trips in vec(raw_trip(), 1..60)) {
        let view = FilterEngine::default()
            .apply(&build(&trips), &FilterSpec::all())
            .expect("apply");
        let stats = Aggregator::default().user_stats(&view, view.availability());
        let table = stats.user_types.value().expect("table");

        prop_assert_eq!(table.iter().map(|e| e.count).sum::<usize>(), trips.len());
        for pair in table.windows(2) {
            prop_assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].value < pair[1].value)
            );
        }
    }

    /// The most common trip's count equals the count of that exact direction.
    #[test]
    fn station_pair_count_is_directional(trips in vec(raw_trip(), 1..60)) {
        let view = FilterEngine::default()
            .apply(&build(&trips), &FilterSpec::all())
            .expect("apply");
        let stats = Aggregator::default().station_stats(&view);
        let mode = stats.most_common_trip.value().expect("mode");

        let direct = trips
            .iter()
            .filter(|t| format!("{} - {}", STATIONS[t.3], STATIONS[t.4]) == mode.value)
            .count();
        prop_assert_eq!(mode.count, direct);
    }
}
