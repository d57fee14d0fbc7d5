pub mod checkin;
pub mod qr;

pub use checkin::CheckinService;
pub use qr::{QrBitmap, QrPayload, ScanInput};

use std::sync::Arc;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{EventCatalog, EventStatus};
use crate::error::AppError;
use crate::store::{keys, Store};

/// Authoritative AG-number pattern; input is uppercased before matching.
static AG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-AG-\d{4,5}$").expect("valid AG pattern"));

const EVENT_SLUG_MAX: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Opaque storage key and canonical QR reference.
    pub id: String,
    /// Human-facing display/lookup key. Unique enough for display; the
    /// uniqueness invariant itself lives on (event_id, ag_no).
    pub public_ticket_id: String,
    pub user_id: String,
    pub event_id: String,
    pub name: String,
    pub ag_no: String,
    pub email: String,
    pub department: String,
    pub semester: String,
    pub created_at: DateTime<Utc>,
    pub checked_in: bool,
}

#[derive(Debug, Clone)]
pub struct TicketInput {
    pub user_id: String,
    pub event_id: String,
    pub full_name: String,
    pub ag_no: String,
    pub email: String,
    pub department: String,
    pub semester: String,
}

/// Display-safe slug: lowercase, non-alphanumeric runs collapsed to a
/// single hyphen, leading/trailing hyphens trimmed.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending = false;
    for c in s.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push('-');
            }
            pending = false;
            out.push(c);
        } else {
            pending = true;
        }
    }
    out
}

/// UI-level helper: format a raw digit string into AG shape while typing
/// ("20227993" -> "2022-AG-7993"). The engine itself never reformats; it
/// validates already-formatted input only.
pub fn format_ag_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 4 {
        let year = &digits[..4];
        let number = &digits[4..digits.len().min(9)];
        format!("{}-AG-{}", year, number)
    } else {
        digits
    }
}

pub(crate) fn load_tickets(store: &Store) -> Vec<Ticket> {
    store.get_or(keys::TICKETS, Vec::new())
}

/// Issues tickets: enforces one ticket per (event, AG number), derives the
/// public ticket id, and persists in a single read-modify-write.
pub struct TicketService {
    store: Arc<Store>,
    catalog: EventCatalog,
}

impl TicketService {
    pub fn new(store: Arc<Store>) -> Self {
        let catalog = EventCatalog::new(store.clone());
        Self { store, catalog }
    }

    pub fn list(&self) -> Vec<Ticket> {
        load_tickets(&self.store)
    }

    pub fn list_for_user(&self, user_id: &str) -> Vec<Ticket> {
        self.list()
            .into_iter()
            .filter(|t| t.user_id == user_id)
            .collect()
    }

    /// Issue a ticket. Preconditions run in order and entirely before any
    /// persistence; a failure leaves the collection untouched.
    pub fn issue(&self, input: TicketInput) -> Result<Ticket, AppError> {
        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::Validation("Full Name is required.".to_string()));
        }

        let email = input.email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("Email is required.".to_string()));
        }

        let ag_no = input.ag_no.trim().to_uppercase();
        if ag_no.is_empty() {
            return Err(AppError::Validation("AG No is required.".to_string()));
        }
        if !AG_REGEX.is_match(&ag_no) {
            return Err(AppError::Validation(
                "AG No format must be YYYY-AG-XXXX or YYYY-AG-XXXXX (digits).".to_string(),
            ));
        }

        let event = self
            .catalog
            .get(&input.event_id)
            .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found.", input.event_id)))?;
        if event.status == EventStatus::Past {
            return Err(AppError::Validation(
                "Registration for this event has closed.".to_string(),
            ));
        }

        let mut tickets = self.list();
        let already = tickets
            .iter()
            .any(|t| t.event_id == event.id && t.ag_no.eq_ignore_ascii_case(&ag_no));
        if already {
            return Err(AppError::DuplicateRegistration(
                "This AG No already has a ticket for this event.".to_string(),
            ));
        }

        let event_slug: String = slug(&event.title).chars().take(EVENT_SLUG_MAX).collect();
        let name_slug = slug(full_name);
        let random = rand::thread_rng().gen_range(1000..=9999);

        let ticket = Ticket {
            id: Uuid::new_v4().to_string(),
            public_ticket_id: format!("{}-{}-{}-{}", event_slug, name_slug, ag_no, random),
            user_id: input.user_id,
            event_id: event.id,
            name: full_name.to_string(),
            ag_no,
            email: email.to_string(),
            department: input.department,
            semester: input.semester,
            created_at: Utc::now(),
            checked_in: false,
        };

        tickets.insert(0, ticket.clone());
        self.store.set(keys::TICKETS, &tickets)?;

        tracing::info!(
            ticket_id = %ticket.id,
            public_id = %ticket.public_ticket_id,
            event_id = %ticket.event_id,
            "ticket issued"
        );
        Ok(ticket)
    }
}
