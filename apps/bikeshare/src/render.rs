//! # Text Rendering
//!
//! Plain-text formatting for reports and raw records. Every function
//! returns a `String`; callers decide where it goes.

use bikeshare_core::{
    CityKey, DurationStats, FrequencyEntry, Mode, Report, Reported, StationStats, TimeStats,
    TripRecord, UserStats,
};
use std::fmt::Display;
use std::time::Duration;

const RULE: &str = "----------------------------------------";

const NO_DATA: &str = "no trips match the selected filters";

fn line(out: &mut String, label: &str, value: impl Display) {
    out.push_str(&format!("{}: {}\n", label, value));
}

fn mode_line<T: Display>(out: &mut String, label: &str, reported: &Reported<Mode<T>>) {
    match reported {
        Reported::Value(mode) => line(out, label, format!("{} (count: {})", mode.value, mode.count)),
        Reported::NoData => line(out, label, NO_DATA),
        Reported::Unavailable => line(out, label, "not available"),
    }
}

fn table(out: &mut String, label: &str, reported: &Reported<Vec<FrequencyEntry>>, city: CityKey) {
    match reported {
        Reported::Value(entries) => {
            out.push_str(&format!("{}:\n", label));
            for entry in entries {
                out.push_str(&format!("  {:<12} {}\n", entry.value, entry.count));
            }
        }
        Reported::NoData => line(out, label, NO_DATA),
        Reported::Unavailable => line(
            out,
            label,
            format!("no {} records for {}", label.to_lowercase(), city.display_name()),
        ),
    }
}

/// Format an hour of day as `17:00`.
#[must_use]
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// `1h 2m 3.0s` style breakdown of a duration in seconds.
#[must_use]
pub fn human_duration(seconds: f64) -> String {
    let whole = seconds.max(0.0).trunc() as u64;
    let fraction = seconds.max(0.0) - whole as f64;
    let (days, rest) = (whole / 86_400, whole % 86_400);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let (minutes, secs) = (rest / 60, rest % 60);
    let secs = secs as f64 + fraction;

    if days > 0 {
        format!("{}d {}h {}m {:.1}s", days, hours, minutes, secs)
    } else if hours > 0 {
        format!("{}h {}m {:.1}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {:.1}s", minutes, secs)
    } else {
        format!("{:.1}s", secs)
    }
}

#[must_use]
pub fn render_elapsed(elapsed: Duration) -> String {
    format!("\nThis took {:.6} seconds.", elapsed.as_secs_f64())
}

#[must_use]
pub fn render_time(stats: &TimeStats) -> String {
    let mut out = String::from("\nCalculating The Most Frequent Times of Travel...\n\n");
    mode_line(&mut out, "Most common month", &stats.most_common_month);
    mode_line(&mut out, "Most common day of week", &stats.most_common_day);
    let hour = stats
        .most_common_start_hour
        .clone()
        .map(|mode| Mode {
            value: hour_label(mode.value),
            count: mode.count,
        });
    mode_line(&mut out, "Most common start hour", &hour);
    out
}

#[must_use]
pub fn render_station(stats: &StationStats) -> String {
    let mut out = String::from("\nCalculating The Most Popular Stations and Trip...\n\n");
    mode_line(&mut out, "Most commonly used start station", &stats.most_common_start_station);
    mode_line(&mut out, "Most commonly used end station", &stats.most_common_end_station);
    mode_line(&mut out, "Most frequent trip", &stats.most_common_trip);
    out
}

#[must_use]
pub fn render_duration(stats: &DurationStats) -> String {
    let mut out = String::from("\nCalculating Trip Duration...\n\n");
    line(&mut out, "Trips", stats.trip_count);
    if stats.timed_trip_count != stats.trip_count {
        line(&mut out, "Trips with a recorded duration", stats.timed_trip_count);
    }
    line(
        &mut out,
        "Total travel time",
        format!("{:.1} seconds ({})", stats.total_seconds, human_duration(stats.total_seconds)),
    );
    match stats.mean_seconds {
        Reported::Value(mean) => line(
            &mut out,
            "Mean travel time",
            format!("{:.1} seconds ({})", mean, human_duration(mean)),
        ),
        Reported::NoData => line(&mut out, "Mean travel time", NO_DATA),
        Reported::Unavailable => line(&mut out, "Mean travel time", "not available"),
    }
    out
}

#[must_use]
pub fn render_user(stats: &UserStats, city: CityKey) -> String {
    let mut out = String::from("\nCalculating User Stats...\n\n");
    table(&mut out, "User types", &stats.user_types, city);
    table(&mut out, "Gender", &stats.genders, city);
    match &stats.birth_years {
        Reported::Value(years) => {
            line(&mut out, "Earliest year of birth", years.earliest);
            line(&mut out, "Most recent year of birth", years.most_recent);
            line(
                &mut out,
                "Most common year of birth",
                format!("{} (count: {})", years.most_common.value, years.most_common.count),
            );
        }
        Reported::NoData => line(&mut out, "Year of birth", NO_DATA),
        Reported::Unavailable => line(
            &mut out,
            "Year of birth",
            format!("no birth year records for {}", city.display_name()),
        ),
    }
    out
}

/// Header naming the city, filter and row count.
#[must_use]
pub fn render_header(report: &Report) -> String {
    format!(
        "{}\n{} | {} | {} trips\n{}",
        RULE,
        report.city.display_name(),
        report.filter,
        report.trip_count,
        RULE
    )
}

/// The full report without timings.
#[must_use]
pub fn render_report(report: &Report) -> String {
    [
        render_header(report),
        render_time(&report.time),
        render_station(&report.station),
        render_duration(&report.duration),
        render_user(&report.user, report.city),
    ]
    .join("")
}

/// One raw record, numbered by its position in the view.
#[must_use]
pub fn render_record(position: usize, record: &TripRecord) -> String {
    let mut out = format!("\n[{}]\n", position);
    line(&mut out, "  Start Time", record.start_time.format("%Y-%m-%d %H:%M:%S"));
    if !record.end_time.is_empty() {
        line(&mut out, "  End Time", &record.end_time);
    }
    if let Some(duration) = record.trip_duration_seconds {
        line(&mut out, "  Trip Duration", format!("{:.1}", duration));
    }
    if let Some(station) = &record.start_station {
        line(&mut out, "  Start Station", station);
    }
    if let Some(station) = &record.end_station {
        line(&mut out, "  End Station", station);
    }
    if let Some(user_type) = &record.user_type {
        line(&mut out, "  User Type", user_type);
    }
    if let Some(gender) = &record.gender {
        line(&mut out, "  Gender", gender);
    }
    if let Some(year) = record.birth_year {
        line(&mut out, "  Birth Year", year);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_duration_breakdown() {
        assert_eq!(human_duration(42.0), "42.0s");
        assert_eq!(human_duration(125.5), "2m 5.5s");
        assert_eq!(human_duration(3_725.0), "1h 2m 5.0s");
        assert_eq!(human_duration(90_061.0), "1d 1h 1m 1.0s");
    }

    #[test]
    fn hour_label_pads() {
        assert_eq!(hour_label(7), "07:00");
        assert_eq!(hour_label(17), "17:00");
    }

    #[test]
    fn unavailable_gender_names_city() {
        let stats = UserStats {
            user_types: Reported::Value(vec![FrequencyEntry {
                value: "Subscriber".to_string(),
                count: 2,
            }]),
            genders: Reported::Unavailable,
            birth_years: Reported::Unavailable,
        };
        let text = render_user(&stats, CityKey::Washington);
        assert!(text.contains("no gender records for Washington"));
        assert!(text.contains("no birth year records for Washington"));
        assert!(text.contains("Subscriber"));
    }

    #[test]
    fn record_omits_blank_cells() {
        let start = chrono::NaiveDate::from_ymd_opt(2017, 6, 11)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp");
        let record = TripRecord::from_parts(start, None, Some("Navy Pier".into()), None, None);
        let text = render_record(7, &record);
        assert!(text.contains("[7]"));
        assert!(text.contains("End Station: Navy Pier"));
        assert!(!text.contains("Start Station"));
        assert!(!text.contains("Trip Duration"));
    }

    #[test]
    fn partial_durations_show_timed_count() {
        let stats = DurationStats {
            trip_count: 3,
            timed_trip_count: 2,
            total_seconds: 300.0,
            mean_seconds: Reported::Value(150.0),
        };
        let text = render_duration(&stats);
        assert!(text.contains("Trips with a recorded duration: 2"));
        assert!(text.contains("Mean travel time: 150.0 seconds (2m 30.0s)"));
    }

    #[test]
    fn empty_view_reports_no_data() {
        let stats = DurationStats {
            trip_count: 0,
            timed_trip_count: 0,
            total_seconds: 0.0,
            mean_seconds: Reported::NoData,
        };
        assert!(render_duration(&stats).contains(NO_DATA));
    }
}
