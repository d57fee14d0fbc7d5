use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tickets::Ticket;

/// The JSON object encoded into the QR symbol, camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub ticket_id: String,
    pub public_ticket_id: String,
    pub user_id: String,
    pub event_id: String,
    pub ag_no: String,
    pub email: String,
    pub department: String,
    pub semester: String,
}

impl QrPayload {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        QrPayload {
            ticket_id: ticket.id.clone(),
            public_ticket_id: ticket.public_ticket_id.clone(),
            user_id: ticket.user_id.clone(),
            event_id: ticket.event_id.clone(),
            ag_no: ticket.ag_no.clone(),
            email: ticket.email.clone(),
            department: ticket.department.clone(),
            semester: ticket.semester.clone(),
        }
    }

    /// The UTF-8 text a QR encoder turns into the symbol.
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw.trim()).ok()
    }
}

/// Classified scanner input: a full payload from our own tickets, or a
/// bare string from a generic reader treated as an AG number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    Payload(QrPayload),
    AgNo(String),
}

impl ScanInput {
    pub fn parse(raw: &str) -> Self {
        match QrPayload::parse(raw) {
            Some(payload) => ScanInput::Payload(payload),
            None => ScanInput::AgNo(raw.trim().to_string()),
        }
    }
}

/// Square 8-bit grayscale raster of an already-encoded QR symbol
/// (0 = black module). Rasterization is an external collaborator; this is
/// only the interchange type handed to the document renderer.
#[derive(Debug, Clone)]
pub struct QrBitmap {
    pub size: u32,
    pub pixels: Vec<u8>,
}

impl QrBitmap {
    pub fn new(size: u32, pixels: Vec<u8>) -> Result<Self, AppError> {
        if pixels.len() != (size as usize) * (size as usize) {
            return Err(AppError::Render(format!(
                "QR bitmap expects {}x{} pixels, got {}",
                size,
                size,
                pixels.len()
            )));
        }
        Ok(Self { size, pixels })
    }
}
