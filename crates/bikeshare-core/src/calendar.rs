//! # Calendar
//!
//! Month and weekday name tables.
//!
//! A `Calendar` is built once at startup and injected into the filter engine
//! and the aggregator, so neither reaches for ambient globals. Name lookups
//! are case-insensitive; reported names are capitalized ("March", "Monday").

use crate::primitives::LAST_SUPPORTED_MONTH;
use chrono::Weekday;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

/// Immutable month / weekday naming and the range of months with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    month_names: [&'static str; 12],
    weekdays: [(&'static str, Weekday); 7],
    last_supported_month: u32,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::english()
    }
}

impl Calendar {
    /// English names, data covering January through June.
    #[must_use]
    pub const fn english() -> Self {
        Self {
            month_names: MONTH_NAMES,
            weekdays: WEEKDAYS,
            last_supported_month: LAST_SUPPORTED_MONTH,
        }
    }

    /// Name of a 1-based month, or `None` outside 1..=12.
    #[must_use]
    pub fn month_name(&self, month: u32) -> Option<&'static str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.month_names.get(index).copied()
    }

    /// 1-based number of a month name, searching the full year.
    #[must_use]
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let name = name.trim();
        self.month_names
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|index| index as u32 + 1)
    }

    /// Whether the published data covers this month.
    #[must_use]
    pub fn is_supported_month(&self, month: u32) -> bool {
        (1..=self.last_supported_month).contains(&month)
    }

    /// Lowercase names of the months a user may filter by.
    pub fn supported_month_names(&self) -> impl Iterator<Item = String> + '_ {
        self.month_names
            .iter()
            .take(self.last_supported_month as usize)
            .map(|m| m.to_lowercase())
    }

    /// Full name of a weekday.
    #[must_use]
    pub fn weekday_name(&self, day: Weekday) -> &'static str {
        self.weekdays[day.num_days_from_monday() as usize].0
    }

    /// Full name of the weekday `offset` days after Monday (0 = Monday).
    #[must_use]
    pub fn weekday_name_from_monday(&self, offset: u32) -> Option<&'static str> {
        self.weekdays.get(offset as usize).map(|(n, _)| *n)
    }

    /// Weekday for a full name, case-insensitively.
    #[must_use]
    pub fn weekday(&self, name: &str) -> Option<Weekday> {
        let name = name.trim();
        self.weekdays
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, day)| *day)
    }

    /// Lowercase weekday names, Monday first.
    pub fn weekday_names(&self) -> impl Iterator<Item = String> + '_ {
        self.weekdays.iter().map(|(n, _)| n.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lookup_is_case_insensitive() {
        let calendar = Calendar::english();
        assert_eq!(calendar.month_number("january"), Some(1));
        assert_eq!(calendar.month_number("JUNE"), Some(6));
        assert_eq!(calendar.month_number("December"), Some(12));
        assert_eq!(calendar.month_number("smarch"), None);
    }

    #[test]
    fn month_name_rejects_out_of_range() {
        let calendar = Calendar::english();
        assert_eq!(calendar.month_name(0), None);
        assert_eq!(calendar.month_name(13), None);
        assert_eq!(calendar.month_name(3), Some("March"));
    }

    #[test]
    fn supported_months_stop_at_june() {
        let calendar = Calendar::english();
        let names: Vec<_> = calendar.supported_month_names().collect();
        assert_eq!(names.len(), 6);
        assert_eq!(names.last().map(String::as_str), Some("june"));
        assert!(calendar.is_supported_month(6));
        assert!(!calendar.is_supported_month(7));
        assert!(!calendar.is_supported_month(0));
    }

    #[test]
    fn weekday_names_round_trip() {
        let calendar = Calendar::english();
        for name in calendar.weekday_names() {
            let day = calendar.weekday(&name).expect("weekday");
            assert!(calendar.weekday_name(day).eq_ignore_ascii_case(&name));
        }
        assert_eq!(calendar.weekday("wEdNeSdAy"), Some(Weekday::Wed));
        assert_eq!(calendar.weekday_name_from_monday(6), Some("Sunday"));
        assert_eq!(calendar.weekday_name_from_monday(7), None);
    }
}
