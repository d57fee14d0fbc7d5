//! Printable ticket document. Pure formatting behind one function
//! boundary; layout and palette follow the society's ticket design.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    calculate_points_for_circle, BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform,
    ImageXObject, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Px, Rect,
};

use crate::catalog::EventDisplay;
use crate::error::AppError;
use crate::tickets::{QrBitmap, Ticket};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
const QR_SIZE_MM: f32 = 45.0;

// Palette (0-255 RGB), matching the society's dark ticket theme.
const BACKGROUND: (u8, u8, u8) = (15, 15, 26);
const HEADER_RED: (u8, u8, u8) = (220, 39, 67);
const HEADER_MAGENTA: (u8, u8, u8) = (194, 52, 165);
const WORD_RED: (u8, u8, u8) = (255, 77, 109);
const WORD_PURPLE: (u8, u8, u8) = (199, 125, 255);
const WORD_CYAN: (u8, u8, u8) = (0, 217, 255);
const MUTED: (u8, u8, u8) = (154, 143, 166);
const FOOTER_GRAY: (u8, u8, u8) = (107, 95, 120);
const DIVIDER: (u8, u8, u8) = (58, 32, 80);
const BOX_BG: (u8, u8, u8) = (18, 12, 28);
const WHITE: (u8, u8, u8) = (255, 255, 255);

/// Render a single-page A4 ticket: branded header, three-color wordmark,
/// detail grid, QR raster, public ticket id and footer disclaimer.
pub fn render_ticket_document(
    ticket: &Ticket,
    event: &EventDisplay,
    qr: &QrBitmap,
) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = PdfDocument::new("TCS Event Ticket", Mm(PAGE_W), Mm(PAGE_H), "ticket");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_err)?;

    // Background and split header bars.
    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BACKGROUND);
    fill_rect(&layer, 0.0, from_top(50.0), PAGE_W / 2.0, 50.0, HEADER_RED);
    fill_rect(&layer, PAGE_W / 2.0, from_top(50.0), PAGE_W / 2.0, 50.0, HEADER_MAGENTA);

    // Wordmark badge: white disc with the society initials.
    let badge = Polygon {
        rings: vec![calculate_points_for_circle(
            Mm(15.0),
            Mm(PAGE_W / 2.0),
            Mm(from_top(25.0)),
        )],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };
    layer.set_fill_color(rgb(WHITE));
    layer.add_polygon(badge);
    text_centered(&layer, "TCS", 32.0, 29.0, HEADER_RED, &bold);

    // Three-color wordmark, one word per brand color.
    let words = [
        ("THE ", WORD_RED),
        ("COMPUTING ", WORD_PURPLE),
        ("SOCIETY", WORD_CYAN),
    ];
    let total: f32 = words.iter().map(|(w, _)| text_width_mm(w, 22.0)).sum();
    let mut x = (PAGE_W - total) / 2.0;
    for (word, color) in words {
        layer.set_fill_color(rgb(color));
        layer.use_text(word, 22.0, Mm(x), Mm(from_top(65.0)), &bold);
        x += text_width_mm(word, 22.0);
    }
    text_centered(&layer, "Department of Computer Science, UAF", 10.0, 73.0, MUTED, &regular);

    divider(&layer, 88.0, 0.5);

    text_centered(&layer, "EVENT TICKET", 18.0, 100.0, WHITE, &bold);
    text_centered(&layer, &event.title, 14.0, 110.0, WORD_CYAN, &bold);

    // Detail box with a two-column grid.
    let box_top = 125.0;
    let box_height = 65.0;
    fill_rect(&layer, MARGIN, from_top(box_top + box_height), PAGE_W - 2.0 * MARGIN, box_height, BOX_BG);
    stroke_rect(&layer, MARGIN, from_top(box_top + box_height), PAGE_W - 2.0 * MARGIN, box_height, HEADER_MAGENTA, 0.8);

    let left = [
        ("Full Name:", ticket.name.as_str()),
        ("Email:", ticket.email.as_str()),
        ("Semester:", ticket.semester.as_str()),
    ];
    let right = [
        ("AG Number:", ticket.ag_no.as_str()),
        ("Department:", ticket.department.as_str()),
        ("Event Date:", event.date.as_str()),
    ];
    for (column, x) in [(left, MARGIN + 12.0), (right, PAGE_W / 2.0 + 10.0)] {
        for (i, (label, value)) in column.into_iter().enumerate() {
            let y = box_top + 15.0 + i as f32 * 17.0;
            layer.set_fill_color(rgb(MUTED));
            layer.use_text(label, 8.0, Mm(x), Mm(from_top(y)), &regular);
            layer.set_fill_color(rgb(WHITE));
            let value = if value.is_empty() { "-" } else { value };
            layer.use_text(value, 8.0, Mm(x), Mm(from_top(y + 5.0)), &bold);
        }
    }

    text_centered(&layer, "SCAN QR CODE AT ENTRY", 11.0, 205.0, WORD_RED, &bold);
    place_qr(&layer, qr, (PAGE_W - QR_SIZE_MM) / 2.0, from_top(213.0 + QR_SIZE_MM));

    text_centered(&layer, "Ticket ID:", 7.0, 266.0, MUTED, &regular);
    text_centered(&layer, &ticket.public_ticket_id, 9.0, 271.0, WORD_CYAN, &regular);

    divider(&layer, 282.0, 0.3);
    text_centered(
        &layer,
        "This ticket is valid for one-time entry only. Present this QR code at the event entrance.",
        7.0,
        288.0,
        FOOTER_GRAY,
        &regular,
    );
    text_centered(
        &layer,
        "© The Computing Society - UAF | thecomputingsociety@gmail.com",
        7.0,
        294.0,
        MUTED,
        &regular,
    );

    doc.save_to_bytes().map_err(render_err)
}

fn render_err(e: impl std::fmt::Display) -> AppError {
    AppError::Render(e.to_string())
}

/// PDF space grows upward; the layout above is specified from the top.
fn from_top(y: f32) -> f32 {
    PAGE_H - y
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb(color));
    let rect = Rect::new(Mm(x), Mm(y), Mm(x + w), Mm(y + h)).with_mode(PaintMode::Fill);
    layer.add_rect(rect);
}

fn stroke_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: (u8, u8, u8), pt: f32) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(pt);
    let rect = Rect::new(Mm(x), Mm(y), Mm(x + w), Mm(y + h)).with_mode(PaintMode::Stroke);
    layer.add_rect(rect);
}

fn divider(layer: &PdfLayerReference, y_from_top: f32, thickness: f32) {
    layer.set_outline_color(rgb(DIVIDER));
    layer.set_outline_thickness(thickness);
    let line = Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(from_top(y_from_top))), false),
            (Point::new(Mm(PAGE_W - MARGIN), Mm(from_top(y_from_top))), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

/// Approximate Helvetica advance width. Good enough to center the short
/// labels this layout uses; builtin fonts carry no metrics table here.
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 0.352_778;
    const AVG_EM: f32 = 0.54;
    text.chars().count() as f32 * size_pt * AVG_EM * PT_TO_MM
}

fn text_centered(
    layer: &PdfLayerReference,
    text: &str,
    size_pt: f32,
    y_from_top: f32,
    color: (u8, u8, u8),
    font: &IndirectFontRef,
) {
    layer.set_fill_color(rgb(color));
    let x = (PAGE_W - text_width_mm(text, size_pt)) / 2.0;
    layer.use_text(text, size_pt, Mm(x.max(MARGIN)), Mm(from_top(y_from_top)), font);
}

fn place_qr(layer: &PdfLayerReference, qr: &QrBitmap, x_mm: f32, y_mm: f32) {
    let xobject = ImageXObject {
        width: Px(qr.size as usize),
        height: Px(qr.size as usize),
        color_space: ColorSpace::Greyscale,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: qr.pixels.clone(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };
    let image = Image::from(xobject);
    // dpi chosen so the raster lands at exactly QR_SIZE_MM on the page.
    let dpi = qr.size as f32 * 25.4 / QR_SIZE_MM;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x_mm)),
            translate_y: Some(Mm(y_mm)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ticket() -> Ticket {
        Ticket {
            id: "c2b3a4d5".to_string(),
            public_ticket_id: "tech-summit-ali-khan-2022-AG-7993-4242".to_string(),
            user_id: "user-1".to_string(),
            event_id: "evt-1".to_string(),
            name: "Ali Khan".to_string(),
            ag_no: "2022-AG-7993".to_string(),
            email: "ali@uaf.edu".to_string(),
            department: "CS".to_string(),
            semester: "5".to_string(),
            created_at: Utc::now(),
            checked_in: false,
        }
    }

    fn display() -> EventDisplay {
        EventDisplay {
            title: "Tech Summit".to_string(),
            date: "October 28, 2025".to_string(),
            time: "18:00".to_string(),
        }
    }

    fn checkerboard(size: u32) -> QrBitmap {
        let pixels = (0..size * size)
            .map(|i| if (i / size + i % size) % 2 == 0 { 0u8 } else { 255u8 })
            .collect();
        QrBitmap::new(size, pixels).unwrap()
    }

    #[test]
    fn renders_a_wellformed_pdf() {
        let bytes = render_ticket_document(&ticket(), &display(), &checkerboard(64)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1024);
    }

    #[test]
    fn empty_fields_render_as_dash() {
        let mut t = ticket();
        t.department = String::new();
        let bytes = render_ticket_document(&t, &display(), &checkerboard(32)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
