use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::filter::DateFilter;
use crate::utils::ApiError;

/// Reference to a user as the backend sends it: a bare identifier or a
/// populated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Record {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Record { id, .. } => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Record { name: Some(name), .. } => name,
            other => other.id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub organizer: String,
    /// `YYYY-MM-DD`, or a full ISO timestamp from some backends
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attendee_count: Option<u32>,
    #[serde(default, alias = "attendees")]
    pub joined_users: Vec<UserRef>,
    #[serde(default)]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Event {
    /// Whether `user_id` is among the attendees, whichever shape they came in
    pub fn has_joined(&self, user_id: &str) -> bool {
        self.joined_users.iter().any(|u| u.id() == user_id)
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.created_by.as_ref().is_some_and(|u| u.id() == user_id)
    }

    pub fn attendees(&self) -> u32 {
        self.attendee_count
            .unwrap_or(self.joined_users.len() as u32)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        let prefix = self.date.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }

    /// Date plus time of day; midnight when the time is missing or odd
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let day = self.day()?;
        Some(day.and_time(parse_time(&self.time).unwrap_or(NaiveTime::MIN)))
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Fields needed to create or update an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub organizer: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
}

impl EventDraft {
    /// Catch missing or malformed fields before a request goes out
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("title", &self.title),
            ("organizer", &self.organizer),
            ("date", &self.date),
            ("time", &self.time),
            ("location", &self.location),
            ("description", &self.description),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err(ApiError::Validation(format!(
                "Date must be YYYY-MM-DD, got '{}'",
                self.date
            )));
        }
        if parse_time(&self.time).is_none() {
            return Err(ApiError::Validation(format!(
                "Time must be HH:MM, got '{}'",
                self.time
            )));
        }
        Ok(())
    }

    /// Start from an existing event, e.g. before editing a few fields
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            organizer: event.organizer.clone(),
            date: event
                .day()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| event.date.clone()),
            time: event.time.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
        }
    }
}

/// Listing parameters; unset fields stay out of the query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<DateFilter>,
}

impl EventQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then(|| term.trim().to_string());
        self
    }

    pub fn filter(mut self, filter: DateFilter) -> Self {
        self.filter = (filter != DateFilter::All).then_some(filter);
        self
    }
}

/// One page of the listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default = "first_page", alias = "page")]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default, alias = "totalItems", alias = "total")]
    pub total_events: u64,
}

fn first_page() -> u32 {
    1
}

impl From<Vec<Event>> for EventPage {
    fn from(events: Vec<Event>) -> Self {
        let total = events.len() as u64;
        Self {
            events,
            current_page: 1,
            total_pages: u32::from(total > 0),
            total_events: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Event {
        serde_json::from_value(json!({
            "_id": "e1",
            "title": "Rust Meetup",
            "organizer": "Ferris",
            "date": "2026-10-19T00:00:00.000Z",
            "time": "18:30",
            "location": "Dhaka",
            "description": "Talks",
            "joinedUsers": ["u1", {"_id": "u2", "name": "Bea"}],
            "createdBy": {"id": "u9", "name": "Owner"}
        }))
        .unwrap()
    }

    #[test]
    fn test_joined_accepts_both_attendee_shapes() {
        let event = sample();
        assert!(event.has_joined("u1"));
        assert!(event.has_joined("u2"));
        assert!(!event.has_joined("u3"));
        assert_eq!(event.joined_users[1].display_name(), "Bea");
        assert_eq!(event.attendees(), 2);
        assert!(event.is_created_by("u9"));
    }

    #[test]
    fn test_dates_and_times() {
        let event = sample();
        assert_eq!(event.day(), NaiveDate::from_ymd_opt(2026, 10, 19));
        assert_eq!(
            event.starts_at(),
            NaiveDate::from_ymd_opt(2026, 10, 19).and_then(|d| d.and_hms_opt(18, 30, 0))
        );

        let mut odd = event.clone();
        odd.time = "evening".into();
        assert_eq!(odd.starts_at().unwrap().time(), NaiveTime::MIN);

        odd.date = "soon".into();
        assert_eq!(odd.day(), None);
    }

    #[test]
    fn test_draft_validation() {
        let draft = EventDraft::from_event(&sample());
        assert_eq!(draft.date, "2026-10-19");
        assert!(draft.validate().is_ok());

        let mut missing = draft.clone();
        missing.title = "  ".into();
        missing.location.clear();
        let err = missing.validate().unwrap_err();
        assert_eq!(err.message(), "Missing required fields: title, location");

        let mut bad_date = draft.clone();
        bad_date.date = "19/10/2026".into();
        assert!(matches!(bad_date.validate(), Err(ApiError::Validation(_))));

        let mut bad_time = draft;
        bad_time.time = "6pm".into();
        assert!(matches!(bad_time.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_query_skips_unset_fields() {
        let query = EventQuery::default()
            .page(2)
            .limit(6)
            .search("  ")
            .filter(DateFilter::All);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 2, "limit": 6})
        );

        let query = EventQuery::default().search(" rust ").filter(DateFilter::CurrentWeek);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"search": "rust", "filter": "current-week"})
        );
    }

    #[test]
    fn test_page_defaults() {
        let page: EventPage =
            serde_json::from_value(json!({"events": [], "totalPages": 3, "total": 14})).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_events, 14);
    }
}
