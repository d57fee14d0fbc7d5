use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::EventCatalog;
use crate::error::AppError;
use crate::store::{keys, Store};
use crate::tickets::{load_tickets, ScanInput, Ticket};

const CSV_HEADERS: [&str; 10] = [
    "publicTicketId",
    "agNo",
    "name",
    "email",
    "eventId",
    "eventTitle",
    "department",
    "semester",
    "createdAt",
    "checkedIn",
];

/// Admin-side ticket operations: lookup, check-in toggling, deletion and
/// CSV export.
pub struct CheckinService {
    store: Arc<Store>,
    catalog: EventCatalog,
}

impl CheckinService {
    pub fn new(store: Arc<Store>) -> Self {
        let catalog = EventCatalog::new(store.clone());
        Self { store, catalog }
    }

    pub fn list(&self) -> Vec<Ticket> {
        load_tickets(&self.store)
    }

    /// Natural-key lookup, case-insensitive on the AG number.
    pub fn find_ticket(&self, ag_no: &str, event_id: &str) -> Option<Ticket> {
        let ag_no = ag_no.trim();
        self.list()
            .into_iter()
            .find(|t| t.event_id == event_id && t.ag_no.eq_ignore_ascii_case(ag_no))
    }

    /// Substring search over AG number, public id, name and email.
    pub fn search(&self, query: &str) -> Vec<Ticket> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.list();
        }
        self.list()
            .into_iter()
            .filter(|t| {
                t.ag_no.to_lowercase().contains(&q)
                    || t.public_ticket_id.to_lowercase().contains(&q)
                    || t.name.to_lowercase().contains(&q)
                    || t.email.to_lowercase().contains(&q)
            })
            .collect()
    }

    pub fn checked_in_count(&self) -> usize {
        self.list().iter().filter(|t| t.checked_in).count()
    }

    /// Idempotent boolean flip; no state machine beyond the flag.
    pub fn set_checked_in(&self, ticket_id: &str, value: bool) -> Result<Ticket, AppError> {
        let mut tickets = self.list();
        let slot = tickets
            .iter_mut()
            .find(|t| t.id == ticket_id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' was not found.", ticket_id)))?;

        slot.checked_in = value;
        let updated = slot.clone();
        self.store.set(keys::TICKETS, &tickets)?;

        tracing::debug!(ticket_id, checked_in = value, "check-in flag updated");
        Ok(updated)
    }

    /// Remove a ticket. This is the only way to lift the one-per-event
    /// constraint for its (event, AG number) pair; the student may
    /// re-register afterwards. Intentional, not a bug.
    pub fn delete_ticket(&self, ticket_id: &str) -> Result<bool, AppError> {
        let mut tickets = self.list();
        let before = tickets.len();
        tickets.retain(|t| t.id != ticket_id);
        if tickets.len() == before {
            return Ok(false);
        }
        self.store.set(keys::TICKETS, &tickets)?;

        tracing::info!(ticket_id, "ticket deleted, registration reopened");
        Ok(true)
    }

    /// Handle raw scanner text: payload JSON resolves by canonical ticket
    /// id (falling back to its AG number), bare strings resolve as an AG
    /// number against the given event. The matched ticket is checked in.
    pub fn check_in_scanned(&self, raw: &str, event_id: &str) -> Result<Ticket, AppError> {
        let ticket = match ScanInput::parse(raw) {
            ScanInput::Payload(payload) => self
                .list()
                .into_iter()
                .find(|t| t.id == payload.ticket_id)
                .or_else(|| self.find_ticket(&payload.ag_no, &payload.event_id)),
            ScanInput::AgNo(ag_no) => self.find_ticket(&ag_no, event_id),
        }
        .ok_or_else(|| {
            AppError::NotFound("Ticket not found for this AG No + Event.".to_string())
        })?;

        self.set_checked_in(&ticket.id, true)
    }

    /// Flatten a ticket set (typically `list()` or a `search` result) into
    /// CSV with a joined, shortened event label. Column order is fixed.
    pub fn export_csv(&self, tickets: &[Ticket]) -> String {
        let titles: HashMap<String, String> = self
            .catalog
            .list()
            .into_iter()
            .map(|e| (e.id, e.title))
            .collect();

        let mut lines = vec![CSV_HEADERS.join(",")];
        for t in tickets {
            let title = titles.get(&t.event_id).map(String::as_str).unwrap_or("Event");
            let event_title = format!("{} • {}", t.event_id, title);
            let created_at = t.created_at.to_rfc3339();
            let row = [
                t.public_ticket_id.as_str(),
                t.ag_no.as_str(),
                t.name.as_str(),
                t.email.as_str(),
                t.event_id.as_str(),
                event_title.as_str(),
                t.department.as_str(),
                t.semester.as_str(),
                created_at.as_str(),
                if t.checked_in { "true" } else { "false" },
            ]
            .map(csv_escape);
            lines.push(row.join(","));
        }
        lines.join("\n")
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::draft;
    use crate::catalog::EventStatus;
    use crate::tickets::{QrPayload, TicketInput, TicketService};

    fn setup() -> (Arc<Store>, TicketService, CheckinService, String) {
        let store = Store::in_memory();
        let event = EventCatalog::new(store.clone())
            .create(draft("Tech Summit", EventStatus::Open))
            .unwrap();
        (
            store.clone(),
            TicketService::new(store.clone()),
            CheckinService::new(store),
            event.id,
        )
    }

    fn input(event_id: &str, ag_no: &str, name: &str) -> TicketInput {
        TicketInput {
            user_id: "user-1".to_string(),
            event_id: event_id.to_string(),
            full_name: name.to_string(),
            ag_no: ag_no.to_string(),
            email: "ali@uaf.edu".to_string(),
            department: "CS".to_string(),
            semester: "5".to_string(),
        }
    }

    #[test]
    fn find_is_case_insensitive_on_ag() {
        let (_, tickets, checkin, event_id) = setup();
        let issued = tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();

        let found = checkin.find_ticket("2022-ag-7993", &event_id).unwrap();
        assert_eq!(found.id, issued.id);
        assert!(checkin.find_ticket("2022-AG-7993", "evt-other").is_none());
    }

    #[test]
    fn set_checked_in_is_idempotent() {
        let (_, tickets, checkin, event_id) = setup();
        let issued = tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();

        let once = checkin.set_checked_in(&issued.id, true).unwrap();
        let twice = checkin.set_checked_in(&issued.id, true).unwrap();
        assert!(once.checked_in && twice.checked_in);
        assert_eq!(checkin.checked_in_count(), 1);

        let reverted = checkin.set_checked_in(&issued.id, false).unwrap();
        assert!(!reverted.checked_in);

        let err = checkin.set_checked_in("missing", true).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn delete_reopens_registration_with_a_fresh_id() {
        let (_, tickets, checkin, event_id) = setup();
        let first = tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();

        assert!(checkin.delete_ticket(&first.id).unwrap());
        assert!(!checkin.delete_ticket(&first.id).unwrap());

        let second = tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();
        assert_ne!(second.id, first.id);
    }

    #[test]
    fn scanned_payload_checks_in_by_canonical_id() {
        let (_, tickets, checkin, event_id) = setup();
        let issued = tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();
        let raw = QrPayload::from_ticket(&issued).to_json().unwrap();

        let checked = checkin.check_in_scanned(&raw, &event_id).unwrap();
        assert_eq!(checked.id, issued.id);
        assert!(checked.checked_in);
    }

    #[test]
    fn scanned_bare_string_falls_back_to_ag_lookup() {
        let (_, tickets, checkin, event_id) = setup();
        let issued = tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();

        let checked = checkin.check_in_scanned("2022-ag-7993", &event_id).unwrap();
        assert_eq!(checked.id, issued.id);

        let err = checkin.check_in_scanned("2022-AG-0000", &event_id).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn search_matches_across_fields() {
        let (_, tickets, checkin, event_id) = setup();
        tickets.issue(input(&event_id, "2022-AG-7993", "Ali Khan")).unwrap();
        tickets.issue(input(&event_id, "2023-AG-1234", "Sara Malik")).unwrap();

        assert_eq!(checkin.search("7993").len(), 1);
        assert_eq!(checkin.search("sara").len(), 1);
        assert_eq!(checkin.search("ali@uaf.edu").len(), 2);
        assert_eq!(checkin.search("  ").len(), 2);
    }

    #[test]
    fn csv_has_fixed_header_and_quoted_fields() {
        let (_, tickets, checkin, event_id) = setup();
        tickets.issue(input(&event_id, "2022-AG-7993", "Khan, Ali")).unwrap();
        tickets.issue(input(&event_id, "2023-AG-1234", "Sara Malik")).unwrap();

        let csv = checkin.export_csv(&checkin.list());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "publicTicketId,agNo,name,email,eventId,eventTitle,department,semester,createdAt,checkedIn"
        );
        // Comma-containing name is quoted.
        assert!(lines[2].contains("\"Khan, Ali\""));
        assert!(lines[1].contains("• Tech Summit"));
        assert!(lines[1].ends_with("false"));
    }

    #[test]
    fn csv_escapes_embedded_quotes() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
