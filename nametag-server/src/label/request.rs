//! Label request and result types

use super::LabelError;
use super::layout::Layout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Padding around the text on content-sized canvases
pub const DEFAULT_PADDING: u32 = 10;
/// Font size used by auto-fit when neither hint nor target canvas is given
pub const DEFAULT_AUTO_FONT_SIZE: u32 = 100;
/// Font size of fixed-canvas labels
pub const DEFAULT_FIXED_FONT_SIZE: u32 = 300;
/// 62 mm tape at 300 dpi
pub const DEFAULT_FIXED_CANVAS: (u32, u32) = (731, 300);
/// Canvas of legacy quadratic labels
pub const LEGACY_CANVAS: (u32, u32) = (696, 271);

// ── Request limits ──────────────────────────────────────────────────

/// Characters per name
pub const MAX_NAME_LEN: usize = 64;
/// Requested font size in pixels
pub const MAX_FONT_SIZE: u32 = 1000;
/// Padding in pixels
pub const MAX_PADDING: u32 = 1000;
/// Longest canvas side in pixels, requested or content-sized
pub const MAX_CANVAS_SIDE: u32 = 10_000;

/// How the font size and canvas are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// Caller supplies the canvas, font size is used as given
    Fixed,
    /// Font size searched or taken from the hint, canvas sized to content
    #[default]
    #[serde(rename = "auto", alias = "auto_fit")]
    AutoFit,
    /// Quadratic size from the longest name on a fixed canvas
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRequest {
    pub first_name: String,
    pub last_name: String,
    pub layout: Layout,
    pub sizing_mode: SizingMode,
    pub font_size_hint: Option<u32>,
    /// `(width, height)`; required for fixed sizing, target area for auto-fit
    pub canvas: Option<(u32, u32)>,
    pub padding: u32,
}

impl LabelRequest {
    /// Auto-fit side-by-side request with default padding
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            layout: Layout::default(),
            sizing_mode: SizingMode::default(),
            font_size_hint: None,
            canvas: None,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_sizing(mut self, sizing_mode: SizingMode) -> Self {
        self.sizing_mode = sizing_mode;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size_hint = Some(font_size);
        self
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas = Some((width, height));
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Check the request and return the trimmed names
    pub fn validate(&self) -> Result<(String, String), LabelError> {
        let first = validate_name(&self.first_name, "first name")?;
        let last = validate_name(&self.last_name, "last name")?;

        if let Some((width, height)) = self.canvas {
            if width == 0 || height == 0 {
                return Err(LabelError::Validation(format!(
                    "canvas must not be empty, got {}x{}",
                    width, height
                )));
            }
            if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
                return Err(LabelError::Validation(format!(
                    "canvas {}x{} exceeds {} pixels per side",
                    width, height, MAX_CANVAS_SIDE
                )));
            }
        }

        if self.sizing_mode == SizingMode::Fixed && self.canvas.is_none() {
            return Err(LabelError::Validation(
                "width and height are required for fixed sizing".to_string(),
            ));
        }

        match self.font_size_hint {
            Some(0) => {
                return Err(LabelError::Validation("font size must be positive".to_string()));
            }
            Some(size) if size > MAX_FONT_SIZE => {
                return Err(LabelError::Validation(format!(
                    "font size {} exceeds {}",
                    size, MAX_FONT_SIZE
                )));
            }
            _ => {}
        }

        if self.padding > MAX_PADDING {
            return Err(LabelError::Validation(format!(
                "padding {} exceeds {}",
                self.padding, MAX_PADDING
            )));
        }

        Ok((first.to_string(), last.to_string()))
    }
}

fn validate_name<'a>(value: &'a str, field: &str) -> Result<&'a str, LabelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LabelError::Validation(format!("{field} is required")));
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(LabelError::Validation(format!(
            "{field} is too long ({len} chars, max {MAX_NAME_LEN})"
        )));
    }
    Ok(trimmed)
}

/// A label written to the artifact store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLabel {
    #[serde(rename = "image_path")]
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub font_size_used: u32,
}
