use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tcs_society::{
    catalog::EventDisplay,
    config::Config,
    error::AppError,
    notify::{ConsoleTransport, Notifier},
    pdf::render_ticket_document,
    tickets::{QrBitmap, QrPayload, TicketInput},
    Society,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tcs_society=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TCS society core demo v{}...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(data_dir = %config.data_dir, "Configuration loaded");

    let society = Society::open(config.clone())?;
    tracing::info!("Store opened and seed data ensured");

    // Periodic session sweep; lazy expiry reaches the same state, this
    // just keeps the stored blob tidy while the demo runs.
    {
        let sweeper = tcs_society::AuthService::new(society.store.clone(), &config);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                if sweeper.sweep_expired() {
                    tracing::debug!("Expired session swept");
                }
            }
        });
    }

    // Student journey: register (or reuse), login, pick an event.
    let email = "ali.khan@student.uaf.edu";
    match society.auth.register("Ali Khan", email, "hunter2-secret") {
        Ok(user) => tracing::info!(user_id = %user.id, "Student registered"),
        Err(AppError::DuplicateEmail(_)) => tracing::info!("Student already registered"),
        Err(e) => return Err(e),
    }
    let (student, session) = society.auth.login(email, "hunter2-secret")?;
    tracing::info!(user_id = %student.id, expires_at = %session.expires_at, "Logged in");

    let event = society
        .events
        .open_events()
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("No open events to register for.".to_string()))?;
    tracing::info!(event_id = %event.id, title = %event.title, "Registering for event");

    // Issue (or look up) the ticket.
    let ticket = match society.tickets.issue(TicketInput {
        user_id: student.id.clone(),
        event_id: event.id.clone(),
        full_name: student.name.clone(),
        ag_no: "2022-AG-7993".to_string(),
        email: student.email.clone(),
        department: "CS".to_string(),
        semester: "5".to_string(),
    }) {
        Ok(ticket) => ticket,
        Err(AppError::DuplicateRegistration(msg)) => {
            tracing::info!("{} Reusing the existing ticket.", msg);
            society
                .checkin
                .find_ticket("2022-AG-7993", &event.id)
                .ok_or_else(|| AppError::NotFound("Existing ticket vanished.".to_string()))?
        }
        Err(e) => return Err(e),
    };
    tracing::info!(public_id = %ticket.public_ticket_id, "Ticket ready");

    // Render the printable document. The QR raster normally comes from
    // the UI's QR encoder; the demo uses a placeholder raster derived
    // from the payload so the layout is exercised end to end.
    let payload = QrPayload::from_ticket(&ticket);
    let qr = placeholder_qr(&payload.to_json()?);
    let display = EventDisplay::from(&event);
    let document = render_ticket_document(&ticket, &display, &qr)?;

    let pdf_path = format!("{}/TCS-Ticket-{}.pdf", society.config.data_dir, ticket.ag_no);
    std::fs::write(&pdf_path, &document)?;
    tracing::info!(path = %pdf_path, bytes = document.len(), "Ticket PDF written");

    // Best-effort email; the ticket stays issued either way.
    let notifier = Notifier::new(ConsoleTransport, &society.config);
    let sent = notifier.send_ticket_email(&ticket, &display, document).await;
    tracing::info!(sent, "Email dispatch finished");

    // Admin side: check in by scanned payload, then export.
    let checked = society.checkin.check_in_scanned(&payload.to_json()?, &event.id)?;
    tracing::info!(ticket_id = %checked.id, checked_in = checked.checked_in, "Checked in");

    let csv = society.checkin.export_csv(&society.checkin.list());
    let csv_path = format!("{}/tcs-tickets.csv", society.config.data_dir);
    std::fs::write(&csv_path, &csv)?;
    tracing::info!(
        path = %csv_path,
        tickets = society.checkin.list().len(),
        checked_in = society.checkin.checked_in_count(),
        "CSV exported"
    );

    society.auth.logout()?;
    tracing::info!("Session closed, demo complete");
    Ok(())
}

/// Deterministic dotted raster standing in for a real QR encoder, which
/// lives with the UI shell. Scanners read the JSON payload, not this.
fn placeholder_qr(payload: &str) -> QrBitmap {
    const MODULES: u32 = 33;
    const SCALE: u32 = 8;
    let size = MODULES * SCALE;

    let bytes = payload.as_bytes();
    let mut pixels = vec![255u8; (size * size) as usize];
    for my in 0..MODULES {
        for mx in 0..MODULES {
            let seed = bytes[((my * MODULES + mx) as usize) % bytes.len()] as u32;
            let edge = my == 0 || mx == 0 || my == MODULES - 1 || mx == MODULES - 1;
            let dark = edge || (seed.wrapping_mul(31).wrapping_add(mx ^ my)) % 3 == 0;
            if !dark {
                continue;
            }
            for py in 0..SCALE {
                for px in 0..SCALE {
                    let x = mx * SCALE + px;
                    let y = my * SCALE + py;
                    pixels[(y * size + x) as usize] = 0;
                }
            }
        }
    }
    QrBitmap { size, pixels }
}
