use std::sync::Arc;

use crate::auth::AuthService;
use crate::catalog::{Event, EventStatus};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{keys, Store};
use crate::tickets::Ticket;

/// Idempotently seed the store: the admin account, two starter events and
/// an empty ticket list. Existing data is never touched.
pub fn ensure_seed_data(store: &Arc<Store>, config: &Config) -> Result<(), AppError> {
    AuthService::new(store.clone(), config).ensure_admin(config)?;

    if store.get::<Vec<Event>>(keys::EVENTS).is_none() {
        store.set(keys::EVENTS, &default_events())?;
        tracing::info!("seeded default events");
    }

    if store.get::<Vec<Ticket>>(keys::TICKETS).is_none() {
        store.set(keys::TICKETS, &Vec::<Ticket>::new())?;
    }

    Ok(())
}

fn default_events() -> Vec<Event> {
    vec![
        Event {
            id: "evt-1".to_string(),
            title: "Tech & Entrepreneurship Summit 4.0".to_string(),
            date: "2025-10-28".to_string(),
            time: "18:00".to_string(),
            venue: "D-Ground (UAF)".to_string(),
            status: EventStatus::Open,
            featured: true,
            capacity: 300,
            seats_remaining: 120,
            tags: vec!["Keynote".to_string(), "Panel".to_string(), "Social Night".to_string()],
            description: "A featured TCS event with talks, networking and a social night.".to_string(),
        },
        Event {
            id: "evt-2".to_string(),
            title: "Programming in Big Data – Seminar".to_string(),
            date: "2025-10-17".to_string(),
            time: "11:00".to_string(),
            venue: "Lecture Theatre, CS Dept.".to_string(),
            status: EventStatus::Open,
            featured: false,
            capacity: 150,
            seats_remaining: 70,
            tags: vec!["Seminar".to_string(), "Big Data".to_string()],
            description: "Seminar on Big Data programming practices.".to_string(),
        },
    ]
}
