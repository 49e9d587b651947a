use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

use super::model::Event;

/// Date ranges offered on the listing
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    CurrentWeek,
    LastWeek,
    CurrentMonth,
    LastMonth,
    Upcoming,
    Past,
}

impl DateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::CurrentWeek => "current-week",
            Self::LastWeek => "last-week",
            Self::CurrentMonth => "current-month",
            Self::LastMonth => "last-month",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
        }
    }

    /// Whether `date` falls in this range as seen from `today`.
    /// Weeks run Sunday to Saturday.
    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Today => date == today,
            Self::CurrentWeek => {
                let start = week_start(today);
                date >= start && date <= start + Duration::days(6)
            }
            Self::LastWeek => {
                let start = week_start(today) - Duration::days(7);
                date >= start && date <= start + Duration::days(6)
            }
            Self::CurrentMonth => date.year() == today.year() && date.month() == today.month(),
            Self::LastMonth => {
                let (year, month) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                date.year() == year && date.month() == month
            }
            Self::Upcoming => date >= today,
            Self::Past => date < today,
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

/// Narrow a listing by title search and date range, newest first.
///
/// Events with an unreadable date only survive the `All` filter.
pub fn filter_events<'a>(
    events: &'a [Event],
    search: &str,
    filter: DateFilter,
    today: NaiveDate,
) -> Vec<&'a Event> {
    let needle = search.trim().to_lowercase();

    let mut matched: Vec<&Event> = events
        .iter()
        .filter(|e| needle.is_empty() || e.title.to_lowercase().contains(&needle))
        .filter(|e| match filter {
            DateFilter::All => true,
            other => e.day().is_some_and(|d| other.matches(d, today)),
        })
        .collect();

    matched.sort_by_key(|e| Reverse(e.starts_at()));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, title: &str, date: &str, time: &str) -> Event {
        serde_json::from_value(json!({
            "id": id, "title": title, "date": date, "time": time
        }))
        .unwrap()
    }

    #[test]
    fn test_week_ranges_start_on_sunday() {
        // 2026-10-21 is a Wednesday
        let today = day(2026, 10, 21);

        assert!(DateFilter::CurrentWeek.matches(day(2026, 10, 18), today));
        assert!(DateFilter::CurrentWeek.matches(day(2026, 10, 24), today));
        assert!(!DateFilter::CurrentWeek.matches(day(2026, 10, 25), today));
        assert!(!DateFilter::CurrentWeek.matches(day(2026, 10, 17), today));

        assert!(DateFilter::LastWeek.matches(day(2026, 10, 11), today));
        assert!(DateFilter::LastWeek.matches(day(2026, 10, 17), today));
        assert!(!DateFilter::LastWeek.matches(day(2026, 10, 18), today));
    }

    #[test]
    fn test_month_ranges() {
        let today = day(2026, 1, 15);
        assert!(DateFilter::CurrentMonth.matches(day(2026, 1, 1), today));
        assert!(!DateFilter::CurrentMonth.matches(day(2025, 1, 15), today));
        assert!(DateFilter::LastMonth.matches(day(2025, 12, 31), today));
        assert!(!DateFilter::LastMonth.matches(day(2026, 12, 1), today));
    }

    #[test]
    fn test_today_upcoming_past() {
        let today = day(2026, 10, 19);
        assert!(DateFilter::Today.matches(today, today));
        assert!(DateFilter::Upcoming.matches(today, today));
        assert!(!DateFilter::Past.matches(today, today));
        assert!(DateFilter::Past.matches(day(2026, 10, 18), today));
        assert!(DateFilter::All.matches(day(1999, 1, 1), today));
    }

    #[test]
    fn test_filter_events_search_and_order() {
        let events = vec![
            event("1", "Rust Meetup", "2026-10-19", "09:00"),
            event("2", "Go Night", "2026-10-20", "18:00"),
            event("3", "rust workshop", "2026-10-19", "17:00"),
            event("4", "Rusty Undated", "tbd", ""),
        ];
        let today = day(2026, 10, 19);

        let found: Vec<&str> = filter_events(&events, "RUST", DateFilter::All, today)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(found, vec!["3", "1", "4"]);

        let found: Vec<&str> = filter_events(&events, "", DateFilter::Today, today)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(found, vec!["3", "1"]);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(DateFilter::LastMonth).unwrap(), json!("last-month"));
        let parsed: DateFilter = serde_json::from_value(json!("current-week")).unwrap();
        assert_eq!(parsed, DateFilter::CurrentWeek);
        assert_eq!(DateFilter::Upcoming.to_string(), "upcoming");
    }
}
