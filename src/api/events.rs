use serde::Deserialize;
use serde_json::Value;

use super::gateway::Gateway;
use crate::constants::{EVENTS_PATH, MY_EVENTS_PATH};
use crate::events::{Event, EventDraft, EventPage, EventQuery};
use crate::utils::ApiError;

/// Listing responses come either paginated or as a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Page(EventPage),
    Plain(Vec<Event>),
}

impl From<ListResponse> for EventPage {
    fn from(response: ListResponse) -> Self {
        match response {
            ListResponse::Page(page) => page,
            ListResponse::Plain(events) => EventPage::from(events),
        }
    }
}

/// Single events may come wrapped as `{ "event": ... }`
#[derive(Deserialize)]
#[serde(untagged)]
enum EventResponse {
    Wrapped { event: Event },
    Bare(Event),
}

impl From<EventResponse> for Event {
    fn from(response: EventResponse) -> Self {
        match response {
            EventResponse::Wrapped { event } => event,
            EventResponse::Bare(event) => event,
        }
    }
}

/// Events CRUD, all through the authorized gateway
pub struct EventsApi {
    gateway: Gateway,
}

impl EventsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn list(&self, query: &EventQuery) -> Result<EventPage, ApiError> {
        let response: ListResponse = self.gateway.get_with_query(EVENTS_PATH, query).await?;
        Ok(response.into())
    }

    pub async fn get(&self, id: &str) -> Result<Event, ApiError> {
        let response: EventResponse = self.gateway.get(&event_path(id)?).await?;
        Ok(response.into())
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        draft.validate()?;
        let response: EventResponse = self.gateway.post(EVENTS_PATH, draft).await?;
        Ok(response.into())
    }

    pub async fn update(&self, id: &str, draft: &EventDraft) -> Result<Event, ApiError> {
        draft.validate()?;
        let response: EventResponse = self.gateway.put(&event_path(id)?, draft).await?;
        Ok(response.into())
    }

    /// Returns whatever acknowledgement the backend sends
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.gateway.delete(&event_path(id)?).await
    }

    pub async fn join(&self, id: &str) -> Result<Event, ApiError> {
        let path = format!("{}/join", event_path(id)?);
        let response: EventResponse = self.gateway.post(&path, &serde_json::json!({})).await?;
        Ok(response.into())
    }

    /// Events created by the logged-in user
    pub async fn mine(&self) -> Result<Vec<Event>, ApiError> {
        if !self.gateway.session().is_authenticated() {
            return Err(ApiError::Validation("You must be logged in".to_string()));
        }
        let response: ListResponse = self.gateway.get(MY_EVENTS_PATH).await?;
        Ok(EventPage::from(response).events)
    }
}

fn event_path(id: &str) -> Result<String, ApiError> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(ApiError::Validation(format!("Invalid event id '{}'", id)));
    }
    Ok(format!("{}/{}", EVENTS_PATH, id))
}
