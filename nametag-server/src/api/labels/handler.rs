//! Label printing handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::core::{PrintOutcome, ServerState};
use crate::label::{DEFAULT_FIXED_CANVAS, Layout, LabelRequest, SizingMode, DEFAULT_PADDING};
use crate::utils::{AppError, AppResult};

/// Print request body shared by every label route
#[derive(Debug, Default, Deserialize)]
pub struct LabelPayload {
    #[serde(default, alias = "attendee_firstname")]
    pub first_name: Option<String>,
    #[serde(default, alias = "attendee_lastname")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub sizing_mode: Option<SizingMode>,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub padding: Option<u32>,
}

impl LabelPayload {
    /// Build a render request
    ///
    /// `default_canvas` fills in missing dimensions; without it, a lone
    /// width or height is rejected.
    fn to_request(
        &self,
        sizing_mode: SizingMode,
        default_layout: Layout,
        default_canvas: Option<(u32, u32)>,
    ) -> AppResult<LabelRequest> {
        let (Some(first_name), Some(last_name)) = (&self.first_name, &self.last_name) else {
            return Err(AppError::validation("Missing first or last name in request body"));
        };

        let canvas = match (self.width, self.height, default_canvas) {
            (Some(width), Some(height), _) => Some((width, height)),
            (None, None, default) => default,
            (width, height, Some((default_width, default_height))) => {
                Some((width.unwrap_or(default_width), height.unwrap_or(default_height)))
            }
            _ => return Err(AppError::validation("width and height must be given together")),
        };

        Ok(LabelRequest {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            layout: self.layout.unwrap_or(default_layout),
            sizing_mode,
            font_size_hint: self.font_size,
            canvas,
            padding: self.padding.unwrap_or(DEFAULT_PADDING),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub message: &'static str,
    pub success: bool,
    pub printer: Option<String>,
    pub data: PrintData,
}

#[derive(Debug, Serialize)]
pub struct PrintData {
    pub first_name: String,
    pub last_name: String,
    pub image_path: PathBuf,
    pub layout: Layout,
    pub sizing_mode: SizingMode,
    pub font_size: u32,
    pub width: u32,
    pub height: u32,
}

/// POST /api/labels/print - render and print with an explicit sizing mode
pub async fn print(
    State(state): State<ServerState>,
    Json(payload): Json<LabelPayload>,
) -> AppResult<(StatusCode, Json<PrintResponse>)> {
    let sizing_mode = payload.sizing_mode.unwrap_or_default();
    let request = payload.to_request(sizing_mode, Layout::SideBySide, None)?;
    run(&state, request).await
}

/// POST /print-dynamic - auto-fit label sized to the text
pub async fn print_dynamic(
    State(state): State<ServerState>,
    Json(payload): Json<LabelPayload>,
) -> AppResult<(StatusCode, Json<PrintResponse>)> {
    let request = payload.to_request(SizingMode::AutoFit, Layout::SideBySide, None)?;
    run(&state, request).await
}

/// POST /print-simple - fixed-size label
pub async fn print_simple(
    State(state): State<ServerState>,
    Json(payload): Json<LabelPayload>,
) -> AppResult<(StatusCode, Json<PrintResponse>)> {
    let request = payload.to_request(SizingMode::Fixed, Layout::SideBySide, Some(DEFAULT_FIXED_CANVAS))?;
    run(&state, request).await
}

/// POST /print-name - legacy name tag, two lines on a landscape canvas
pub async fn print_name(
    State(state): State<ServerState>,
    Json(payload): Json<LabelPayload>,
) -> AppResult<(StatusCode, Json<PrintResponse>)> {
    let request = payload.to_request(SizingMode::Legacy, Layout::Stacked, None)?;
    run(&state, request).await
}

async fn run(state: &ServerState, request: LabelRequest) -> AppResult<(StatusCode, Json<PrintResponse>)> {
    info!(
        first_name = %request.first_name,
        last_name = %request.last_name,
        "Label print requested"
    );

    let first_name = request.first_name.clone();
    let last_name = request.last_name.clone();
    let layout = request.layout;
    let sizing_mode = request.sizing_mode;

    let PrintOutcome {
        printed,
        printer,
        label,
    } = state.print_label(request).await?;

    let (status, message) = if printed {
        (StatusCode::OK, "Print successful")
    } else {
        (StatusCode::ACCEPTED, "Print failed, but image saved")
    };

    Ok((
        status,
        Json(PrintResponse {
            message,
            success: printed,
            printer,
            data: PrintData {
                first_name,
                last_name,
                image_path: label.path,
                layout,
                sizing_mode,
                font_size: label.font_size_used,
                width: label.width,
                height: label.height,
            },
        }),
    ))
}
