use std::future::Future;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::catalog::EventDisplay;
use crate::config::Config;
use crate::error::AppError;
use crate::tickets::Ticket;

/// A fully composed ticket confirmation, transport-agnostic.
#[derive(Debug, Clone)]
pub struct TicketEmail {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
    /// The rendered ticket document, attached when the transport supports it.
    pub document: Vec<u8>,
}

impl TicketEmail {
    pub fn for_ticket(ticket: &Ticket, event: &EventDisplay, document: Vec<u8>) -> Self {
        let body = format!(
            "Hi {name},\n\n\
             Your ticket for {event} is confirmed.\n\n\
             Ticket ID:  {public_id}\n\
             AG Number:  {ag}\n\
             Department: {dept}\n\
             Semester:   {sem}\n\
             Date:       {date} at {time}\n\n\
             Your printable ticket is attached. Present its QR code at the entrance.\n\n\
             The Computing Society",
            name = ticket.name,
            event = event.title,
            public_id = ticket.public_ticket_id,
            ag = ticket.ag_no,
            dept = ticket.department,
            sem = ticket.semester,
            date = event.date,
            time = event.time,
        );
        TicketEmail {
            to: ticket.email.clone(),
            to_name: ticket.name.clone(),
            subject: format!("Your ticket for {}", event.title),
            body,
            document,
        }
    }
}

/// Delivery seam. Implementations must not retry internally; the
/// [`Notifier`] owns timeout and retry policy.
pub trait EmailTransport: Send + Sync {
    fn send(&self, email: &TicketEmail) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Development transport: logs the email instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport;

impl EmailTransport for ConsoleTransport {
    async fn send(&self, email: &TicketEmail) -> Result<(), AppError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            attachment_bytes = email.document.len(),
            "ticket email (console transport)\n{}",
            email.body
        );
        Ok(())
    }
}

/// SMTP transport backed by lettre, the PDF attached as
/// `application/pdf`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build from configuration; `None` when no SMTP host is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(None);
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| AppError::Email(format!("Invalid SMTP relay '{}': {}", host, e)))?;
        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = config
            .mail_from
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid TCS_MAIL_FROM: {}", e)))?;

        Ok(Some(SmtpMailer {
            transport: builder.build(),
            from,
        }))
    }
}

impl EmailTransport for SmtpMailer {
    async fn send(&self, email: &TicketEmail) -> Result<(), AppError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient '{}': {}", email.to, e)))?;

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| AppError::Email(e.to_string()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(email.body.clone()))
                    .singlepart(
                        Attachment::new("ticket.pdf".to_string())
                            .body(email.document.clone(), pdf_type),
                    ),
            )
            .map_err(|e| AppError::Email(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;
        Ok(())
    }
}

/// Best-effort dispatcher. Failure never affects the already-persisted
/// ticket; the boolean exists purely for soft UI status.
pub struct Notifier<T: EmailTransport> {
    transport: T,
    timeout: Duration,
    retries: u32,
}

impl<T: EmailTransport> Notifier<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            timeout: config.email_timeout(),
            retries: config.email_retries,
        }
    }

    /// Deliver the rendered ticket. Bounded by the configured timeout per
    /// attempt, retried at most `retries` extra times.
    pub async fn send_ticket_email(
        &self,
        ticket: &Ticket,
        event: &EventDisplay,
        document: Vec<u8>,
    ) -> bool {
        let email = TicketEmail::for_ticket(ticket, event, document);

        let attempts = self.retries + 1;
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, self.transport.send(&email)).await {
                Ok(Ok(())) => {
                    tracing::info!(to = %email.to, "ticket email sent");
                    return true;
                }
                Ok(Err(e)) => {
                    tracing::warn!(to = %email.to, attempt, error = %e, "ticket email failed");
                }
                Err(_) => {
                    tracing::warn!(to = %email.to, attempt, "ticket email timed out");
                }
            }
        }
        false
    }
}
