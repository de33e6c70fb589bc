//! Label printing routes
//!
//! | Path | Method | Sizing |
//! |------|--------|--------|
//! | /api/labels/print | POST | from `sizing_mode` (default auto) |
//! | /print-dynamic | POST | auto, canvas sized to the text |
//! | /print-simple | POST | fixed, 731x300 unless given |
//! | /print-name | POST | legacy quadratic, `attendee_firstname` / `attendee_lastname` |
//!
//! Responses are 200 when the printer accepted the label, 202 when the
//! label was rendered and kept but not printed.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::{LabelPayload, PrintData, PrintResponse};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/labels/print", post(handler::print))
        .route("/print-dynamic", post(handler::print_dynamic))
        .route("/print-simple", post(handler::print_simple))
        .route("/print-name", post(handler::print_name))
}
