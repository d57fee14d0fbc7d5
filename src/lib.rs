//! Core services for The Computing Society portal: a JSON key-value store
//! with change notifications, identity and sessions, the event catalog,
//! ticket issuance and check-in, document rendering and best-effort email
//! delivery. UI shells sit on top of [`Society`] and stay out of this
//! crate.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod notify;
pub mod pdf;
pub mod seed;
pub mod store;
pub mod tickets;

pub use auth::{AuthService, PublicUser, Role, Session, User};
pub use catalog::{Event, EventCatalog, EventDisplay, EventDraft, EventStatus};
pub use config::Config;
pub use content::{ContentCollection, SocietyContent};
pub use error::AppError;
pub use notify::{ConsoleTransport, EmailTransport, Notifier, SmtpMailer, TicketEmail};
pub use pdf::render_ticket_document;
pub use store::{FileBackend, MemoryBackend, StorageBackend, Store, StoreEvent};
pub use tickets::{
    CheckinService, QrBitmap, QrPayload, ScanInput, Ticket, TicketInput, TicketService,
};

use std::sync::Arc;

/// All services wired over one shared store.
pub struct Society {
    pub config: Config,
    pub store: Arc<Store>,
    pub auth: AuthService,
    pub events: EventCatalog,
    pub tickets: TicketService,
    pub checkin: CheckinService,
    pub content: SocietyContent,
}

impl Society {
    pub fn new(config: Config, store: Arc<Store>) -> Self {
        Self {
            auth: AuthService::new(store.clone(), &config),
            events: EventCatalog::new(store.clone()),
            tickets: TicketService::new(store.clone()),
            checkin: CheckinService::new(store.clone()),
            content: SocietyContent::new(store.clone()),
            store,
            config,
        }
    }

    /// File-backed portal rooted at `config.data_dir`, seeded.
    pub fn open(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(Store::new(FileBackend::new(config.data_dir.clone())?));
        seed::ensure_seed_data(&store, &config)?;
        Ok(Self::new(config, store))
    }

    /// In-memory portal, seeded. Used by tests and embedding callers.
    pub fn in_memory(config: Config) -> Result<Self, AppError> {
        let store = Store::in_memory();
        seed::ensure_seed_data(&store, &config)?;
        Ok(Self::new(config, store))
    }
}
