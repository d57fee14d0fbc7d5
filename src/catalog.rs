use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{keys, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Closed,
    Past,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// ISO date, e.g. "2025-10-28".
    pub date: String,
    /// 24h wall-clock time, e.g. "18:00".
    pub time: String,
    pub venue: String,
    pub status: EventStatus,
    pub featured: bool,
    pub capacity: u32,
    pub seats_remaining: u32,
    pub tags: Vec<String>,
    pub description: String,
}

/// Everything except the id; what admin forms submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub status: EventStatus,
    pub featured: bool,
    pub capacity: u32,
    pub seats_remaining: u32,
    pub tags: Vec<String>,
    pub description: String,
}

impl EventDraft {
    fn into_event(self, id: String) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            venue: self.venue,
            status: self.status,
            featured: self.featured,
            capacity: self.capacity,
            seats_remaining: self.seats_remaining,
            tags: self.tags,
            description: self.description,
        }
    }
}

/// Resolved display fields handed to the document renderer and mailer.
#[derive(Debug, Clone)]
pub struct EventDisplay {
    pub title: String,
    /// Long-form date, e.g. "October 28, 2025".
    pub date: String,
    pub time: String,
}

impl From<&Event> for EventDisplay {
    fn from(event: &Event) -> Self {
        EventDisplay {
            title: event.title.clone(),
            date: format_display_date(&event.date),
            time: event.time.clone(),
        }
    }
}

/// "2025-10-28" -> "October 28, 2025"; anything unparseable passes through.
pub fn format_display_date(iso: &str) -> String {
    match chrono::NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

/// CRUD over event records. Admin surfaces own the writes; the ticketing
/// engine only ever reads.
pub struct EventCatalog {
    store: Arc<Store>,
}

impl EventCatalog {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Event> {
        self.store.get_or(keys::EVENTS, Vec::new())
    }

    pub fn get(&self, id: &str) -> Option<Event> {
        self.list().into_iter().find(|e| e.id == id)
    }

    /// Events a student can still register for.
    pub fn open_events(&self) -> Vec<Event> {
        self.list()
            .into_iter()
            .filter(|e| e.status != EventStatus::Past)
            .collect()
    }

    pub fn create(&self, draft: EventDraft) -> Result<Event, AppError> {
        let event = draft.into_event(Uuid::new_v4().to_string());
        let mut events = self.list();
        events.insert(0, event.clone());
        self.store.set(keys::EVENTS, &events)?;

        tracing::debug!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    pub fn update(&self, id: &str, draft: EventDraft) -> Result<Event, AppError> {
        let mut events = self.list();
        let slot = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found.", id)))?;

        *slot = draft.into_event(id.to_string());
        let updated = slot.clone();
        self.store.set(keys::EVENTS, &events)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut events = self.list();
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Ok(false);
        }
        self.store.set(keys::EVENTS, &events)?;
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn draft(title: &str, status: EventStatus) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            date: "2025-10-28".to_string(),
            time: "18:00".to_string(),
            venue: "D-Ground (UAF)".to_string(),
            status,
            featured: false,
            capacity: 300,
            seats_remaining: 120,
            tags: vec!["Keynote".to_string()],
            description: "An evening of talks and networking.".to_string(),
        }
    }

    #[test]
    fn crud_round_trip() {
        let catalog = EventCatalog::new(Store::in_memory());

        let event = catalog.create(draft("Tech Summit", EventStatus::Open)).unwrap();
        assert_eq!(catalog.get(&event.id).unwrap().title, "Tech Summit");

        let mut changed = draft("Tech Summit 4.0", EventStatus::Closed);
        changed.seats_remaining = 0;
        let updated = catalog.update(&event.id, changed).unwrap();
        assert_eq!(updated.title, "Tech Summit 4.0");
        assert_eq!(updated.status, EventStatus::Closed);

        assert!(catalog.delete(&event.id).unwrap());
        assert!(!catalog.delete(&event.id).unwrap());
        assert!(catalog.get(&event.id).is_none());
    }

    #[test]
    fn update_of_missing_event_is_not_found() {
        let catalog = EventCatalog::new(Store::in_memory());
        let err = catalog.update("evt-missing", draft("X", EventStatus::Open)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn open_events_hide_past_ones() {
        let catalog = EventCatalog::new(Store::in_memory());
        catalog.create(draft("Old Seminar", EventStatus::Past)).unwrap();
        let open = catalog.create(draft("Summit", EventStatus::Open)).unwrap();
        catalog.create(draft("Waitlist", EventStatus::Closed)).unwrap();

        let visible = catalog.open_events();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().any(|e| e.id == open.id));
        assert!(visible.iter().all(|e| e.status != EventStatus::Past));
    }

    #[test]
    fn display_date_is_long_form() {
        assert_eq!(format_display_date("2025-10-28"), "October 28, 2025");
        assert_eq!(format_display_date("2025-03-08"), "March 8, 2025");
        assert_eq!(format_display_date("TBA"), "TBA");
    }

    #[test]
    fn newest_event_lists_first() {
        let catalog = EventCatalog::new(Store::in_memory());
        catalog.create(draft("First", EventStatus::Open)).unwrap();
        catalog.create(draft("Second", EventStatus::Open)).unwrap();
        assert_eq!(catalog.list()[0].title, "Second");
    }
}
