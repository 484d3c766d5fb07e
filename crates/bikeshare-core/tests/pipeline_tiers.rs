//! # Pipeline Tier Tests (T0-T3)
//!
//! If ANY tier fails, the pipeline is INVALID.
//!
//! ## Tiers
//! - T0: Load Integrity
//! - T1: Filter Semantics
//! - T2: Aggregation
//! - T3: Session Passes

use bikeshare_core::{
    Aggregator, BikeshareError, Calendar, CityAvailability, CityCatalog, CityKey, CsvDirectory,
    Dataset, FilterEngine, FilterSpec, InMemorySource, Mode, Page, PageSignal, Reported, Session,
    SessionRequest, TripSource,
};
use std::sync::Arc;

const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1,2017-01-02 08:05:00,2017-01-02 08:07:00,120,Canal St,Clark St,Subscriber,Male,1980.0
2,2017-01-02 08:30:00,2017-01-02 08:35:00,300,Canal St,Clark St,Subscriber,Female,1990.0
3,2017-03-06 17:10:00,2017-03-06 17:13:00,180,Clark St,Canal St,Customer,,
4,2017-03-10 17:45:00,2017-03-10 17:50:00,300,Clark St,Canal St,Subscriber,Female,1990.0
5,2017-06-11 12:00:00,2017-06-11 12:20:00,1200,Lake Shore Dr,Navy Pier,Customer,,1975.0
";

const WASHINGTON_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1,2017-04-03 07:00:00,2017-04-03 07:10:00,600.5,Union Station,Capitol Hill,Subscriber
2,2017-04-04 07:00:00,2017-04-04 07:10:00,599.5,Union Station,Capitol Hill,Customer
";

fn source() -> InMemorySource {
    InMemorySource::new(CityCatalog::standard())
        .with_csv(CityKey::Chicago, CHICAGO_CSV)
        .with_csv(CityKey::Washington, WASHINGTON_CSV)
}

fn chicago() -> Arc<Dataset> {
    Arc::new(source().load(CityKey::Chicago).expect("load chicago"))
}

// =============================================================================
// TIER T0: LOAD INTEGRITY
// =============================================================================

mod t0_load_integrity {
    use super::*;

    /// T0.1: Every row is loaded, in file order.
    #[test]
    fn rows_loaded_in_order() {
        let dataset = chicago();
        assert_eq!(dataset.len(), 5);
        let durations: Vec<Option<f64>> = dataset
            .records()
            .iter()
            .map(|r| r.trip_duration_seconds)
            .collect();
        assert_eq!(
            durations,
            vec![Some(120.0), Some(300.0), Some(180.0), Some(300.0), Some(1200.0)]
        );
    }

    /// T0.2: Unknown city keys are rejected before any load.
    #[test]
    fn unknown_city_rejected() {
        let result = "gotham".parse::<CityKey>();
        assert!(matches!(result, Err(BikeshareError::UnknownCity(_))));
    }

    /// T0.3: An unparseable start time rejects the load.
    #[test]
    fn unparseable_timestamp_rejected() {
        let broken = CHICAGO_CSV.replace("2017-03-06 17:10:00", "yesterday");
        let source = InMemorySource::new(CityCatalog::standard()).with_csv(CityKey::Chicago, broken);
        let result = source.load(CityKey::Chicago);
        assert!(matches!(result, Err(BikeshareError::DataLoad(_))));
    }

    /// T0.4: A missing file is a load error, not an empty dataset.
    #[test]
    fn missing_file_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = CsvDirectory::new(dir.path(), CityCatalog::standard());
        let result = source.load(CityKey::Washington);
        assert!(matches!(result, Err(BikeshareError::DataLoad(_))));
    }

    /// T0.5: Blank duration and station cells load as missing values.
    #[test]
    fn blank_cells_do_not_reject_load() {
        let truncated = format!("{}6,2017-06-30 23:59:45,,,,,Subscriber,,\n", CHICAGO_CSV);
        let source =
            InMemorySource::new(CityCatalog::standard()).with_csv(CityKey::Chicago, truncated);
        let dataset = source.load(CityKey::Chicago).expect("load");

        assert_eq!(dataset.len(), 6);
        let last = dataset.get(5).expect("last row");
        assert_eq!(last.trip_duration_seconds, None);
        assert_eq!(last.start_station, None);
        assert_eq!(last.end_station, None);
    }

    /// T0.6: Availability follows the catalog.
    #[test]
    fn availability_from_catalog() {
        let washington = source().load(CityKey::Washington).expect("load");
        assert_eq!(
            washington.availability(),
            CityAvailability::without_demographics()
        );
        assert!(chicago().availability().has_demographics());
    }
}

// =============================================================================
// TIER T1: FILTER SEMANTICS
// =============================================================================

mod t1_filter_semantics {
    use super::*;

    /// T1.1: all/all is the identity.
    #[test]
    fn unfiltered_is_identity() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::all())
            .expect("apply");
        assert_eq!(view.row_indices(), &[0, 1, 2, 3, 4]);
    }

    /// T1.2: Month and day compose with AND.
    #[test]
    fn month_and_day_conjunctive() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::new("march", "friday"))
            .expect("apply");
        assert_eq!(view.row_indices(), &[3]);
    }

    /// T1.3: Applying month then day equals day then month.
    #[test]
    fn composition_commutes() {
        let engine = FilterEngine::default();
        let dataset = chicago();

        let month_first = engine
            .apply(&dataset, &FilterSpec::new("march", "all"))
            .and_then(|v| engine.refine(&v, &FilterSpec::new("all", "monday")))
            .expect("month first");
        let day_first = engine
            .apply(&dataset, &FilterSpec::new("all", "monday"))
            .and_then(|v| engine.refine(&v, &FilterSpec::new("march", "all")))
            .expect("day first");

        assert_eq!(month_first.row_indices(), day_first.row_indices());
        assert_eq!(month_first.row_indices(), &[2]);
    }

    /// T1.4: Re-applying a filter to its own output is a no-op.
    #[test]
    fn refine_is_idempotent() {
        let engine = FilterEngine::default();
        let spec = FilterSpec::new("january", "monday");
        let once = engine.apply(&chicago(), &spec).expect("once");
        let twice = engine.refine(&once, &spec).expect("twice");
        assert_eq!(once.row_indices(), twice.row_indices());
    }

    /// T1.5: Validation keeps later months out; the engine still copes.
    #[test]
    fn december_validation_and_engine() {
        let calendar = Calendar::english();
        assert!(matches!(
            FilterSpec::validated("december", "all", &calendar),
            Err(BikeshareError::Validation(_))
        ));

        let view = FilterEngine::new(calendar)
            .apply(&chicago(), &FilterSpec::new("december", "all"))
            .expect("apply");
        assert!(view.is_empty());
    }
}

// =============================================================================
// TIER T2: AGGREGATION
// =============================================================================

mod t2_aggregation {
    use super::*;

    /// T2.1: Time statistics on the full dataset.
    #[test]
    fn time_statistics() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::all())
            .expect("apply");
        let stats = Aggregator::default().time_stats(&view);

        // January and March tie at 2; January is lower.
        assert_eq!(
            stats.most_common_month,
            Reported::Value(Mode {
                value: "January".to_string(),
                count: 2
            })
        );
        // Monday: 2017-01-02 (x2) and 2017-03-06.
        assert_eq!(
            stats.most_common_day.value().map(|m| (m.value.as_str(), m.count)),
            Some(("Monday", 3))
        );
        // Hours 8 and 17 tie at 2; 8 is lower.
        assert_eq!(
            stats.most_common_start_hour.value().map(|m| m.value),
            Some(8)
        );
    }

    /// T2.2: Most common trip keeps direction.
    #[test]
    fn station_pair_direction() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::new("all", "all"))
            .expect("apply");
        let stats = Aggregator::default().station_stats(&view);

        // Canal->Clark x2 and Clark->Canal x2 tie; "Canal St - Clark St" sorts first.
        assert_eq!(
            stats.most_common_trip,
            Reported::Value(Mode {
                value: "Canal St - Clark St".to_string(),
                count: 2
            })
        );
    }

    /// T2.3: Duration sum and mean over a filtered view.
    #[test]
    fn duration_over_view() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::new("january", "all"))
            .expect("apply");
        let stats = Aggregator::default().duration_stats(&view);
        assert_eq!(stats.trip_count, 2);
        assert!((stats.total_seconds - 420.0).abs() < 1e-9);
        assert_eq!(stats.mean_seconds, Reported::Value(210.0));
    }

    /// T2.4: Blank durations and stations are left out of their statistics.
    #[test]
    fn blank_cells_skipped_by_aggregation() {
        let truncated = format!("{}6,2017-06-30 23:59:45,,,,,Subscriber,,\n", CHICAGO_CSV);
        let source =
            InMemorySource::new(CityCatalog::standard()).with_csv(CityKey::Chicago, truncated);
        let dataset = Arc::new(source.load(CityKey::Chicago).expect("load"));
        let view = FilterEngine::default()
            .apply(&dataset, &FilterSpec::new("june", "all"))
            .expect("apply");
        let aggregator = Aggregator::default();

        let duration = aggregator.duration_stats(&view);
        assert_eq!(duration.trip_count, 2);
        assert_eq!(duration.timed_trip_count, 1);
        assert_eq!(duration.mean_seconds, Reported::Value(1200.0));

        let station = aggregator.station_stats(&view);
        assert_eq!(
            station.most_common_trip.value(),
            Some(&Mode {
                value: "Lake Shore Dr - Navy Pier".to_string(),
                count: 1
            })
        );

        let users = aggregator.user_stats(&view, view.availability());
        assert_eq!(
            users.user_types.value().map(|t| t.iter().map(|e| e.count).sum::<usize>()),
            Some(2)
        );
    }

    /// T2.5: Birth-year and gender skip their own missing values only.
    #[test]
    fn demographics_per_field_exclusion() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::all())
            .expect("apply");
        let stats = Aggregator::default().user_stats(&view, view.availability());

        let genders = stats.genders.value().expect("genders");
        assert_eq!(genders.len(), 2);
        assert_eq!((genders[0].value.as_str(), genders[0].count), ("Female", 2));
        assert_eq!((genders[1].value.as_str(), genders[1].count), ("Male", 1));

        let years = stats.birth_years.value().expect("years");
        assert_eq!(years.earliest, 1975);
        assert_eq!(years.most_recent, 1990);
        assert_eq!(years.most_common, Mode { value: 1990, count: 2 });

        let types = stats.user_types.value().expect("types");
        assert_eq!(types.iter().map(|e| e.count).sum::<usize>(), 5);
    }

    /// T2.6: Washington never reports demographics.
    #[test]
    fn washington_unavailable() {
        let washington = Arc::new(source().load(CityKey::Washington).expect("load"));
        for spec in [FilterSpec::all(), FilterSpec::new("april", "monday")] {
            let view = FilterEngine::default().apply(&washington, &spec).expect("apply");
            let stats = Aggregator::default().user_stats(&view, view.availability());
            assert!(stats.genders.is_unavailable());
            assert!(stats.birth_years.is_unavailable());
        }
    }

    /// T2.7: Empty view yields explicit NoData markers.
    #[test]
    fn empty_view_no_data() {
        let view = FilterEngine::default()
            .apply(&chicago(), &FilterSpec::new("december", "all"))
            .expect("apply");
        let report = Aggregator::default().report(&view, &FilterSpec::new("december", "all"));

        assert_eq!(report.trip_count, 0);
        assert!(report.duration.mean_seconds.is_no_data());
        assert!(report.duration.total_seconds.abs() < f64::EPSILON);
        assert!(report.user.user_types.is_no_data());
        assert!(report.user.genders.is_no_data());
        assert!(report.user.birth_years.is_no_data());
        assert!(report.station.most_common_trip.is_no_data());
    }
}

// =============================================================================
// TIER T3: SESSION PASSES
// =============================================================================

mod t3_session {
    use super::*;

    /// T3.1: Twelve records page as 5, 5, 2, then end.
    #[test]
    fn twelve_record_pagination() {
        let mut csv = String::from(
            "Start Time,End Time,Trip Duration,Start Station,End Station,User Type\n",
        );
        for i in 0..12 {
            csv.push_str(&format!(
                "2017-02-{:02} 10:00:00,2017-02-{:02} 10:05:00,300,S{},T,Subscriber\n",
                i + 1,
                i + 1,
                i
            ));
        }
        let source =
            InMemorySource::new(CityCatalog::standard()).with_csv(CityKey::Washington, csv);
        let mut session = Session::new(source, Calendar::english());
        let pass = session
            .begin(SessionRequest::new(CityKey::Washington, FilterSpec::all()))
            .expect("begin");

        let mut pager = pass.pager();
        let mut batches = Vec::new();
        for _ in 0..3 {
            if let Page::Batch { records, .. } = pager.next_page(PageSignal::Continue) {
                batches.push(
                    records
                        .iter()
                        .map(|r| r.start_station.clone().unwrap_or_default())
                        .collect::<Vec<_>>(),
                );
            }
        }
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], vec!["S0", "S1", "S2", "S3", "S4"]);
        assert_eq!(batches[1], vec!["S5", "S6", "S7", "S8", "S9"]);
        assert_eq!(batches[2], vec!["S10", "S11"]);
        assert_eq!(pager.next_page(PageSignal::Stop), Page::End);
    }

    /// T3.2: A new pass after restart shares nothing with the old one.
    #[test]
    fn restart_is_independent() {
        let mut session = Session::new(source(), Calendar::english());

        let first_len = session
            .begin(SessionRequest::new(
                CityKey::Chicago,
                FilterSpec::new("march", "friday"),
            ))
            .expect("first")
            .view()
            .len();
        assert_eq!(first_len, 1);

        session.restart();

        let pass = session
            .begin(SessionRequest::new(CityKey::Washington, FilterSpec::all()))
            .expect("second");
        assert_eq!(pass.view().len(), 2);
        assert_eq!(pass.report().city, CityKey::Washington);
        assert_eq!(pass.request().filter, FilterSpec::all());
        assert!(pass.report().user.genders.is_unavailable());
    }

    /// T3.3: The report matches running the aggregator directly.
    #[test]
    fn session_report_matches_aggregator() {
        let mut session = Session::new(source(), Calendar::english());
        let spec = FilterSpec::new("january", "all");
        let pass = session
            .begin(SessionRequest::new(CityKey::Chicago, spec.clone()))
            .expect("begin");

        let direct = Aggregator::default().report(pass.view(), &spec);
        assert_eq!(pass.report(), &direct);
    }
}
