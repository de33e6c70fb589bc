//! Name label rendering
//!
//! - [`TextMeasurer`] - typeface loading and ink box measurement
//! - [`FontSizeSolver`] - fixed, auto-fit and legacy quadratic sizing
//! - [`LayoutComposer`] - side-by-side / stacked placement
//! - [`LabelRenderer`] - canvas drawing and artifact storage

pub mod layout;
pub mod measure;
pub mod render;
pub mod request;
pub mod solver;

pub use layout::{CanvasMode, Composition, Layout, LayoutComposer, StackGap, TextRun};
pub use measure::{FontSource, TextExtent, TextMeasurer, font_candidates};
pub use render::{LabelRenderer, RenderOptions};
pub use request::{
    DEFAULT_AUTO_FONT_SIZE, DEFAULT_FIXED_CANVAS, DEFAULT_FIXED_FONT_SIZE, DEFAULT_PADDING,
    LEGACY_CANVAS, LabelRequest, MAX_CANVAS_SIDE, MAX_FONT_SIZE, MAX_NAME_LEN, MAX_PADDING,
    RenderedLabel, SizingMode,
};
pub use solver::{FontSizeSolver, FontSizes, legacy_quadratic_size};

use thiserror::Error;

/// Label rendering errors
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Invalid label request: {0}")]
    Validation(String),

    #[error("Failed to write label image: {0}")]
    Write(#[from] image::ImageError),

    #[error("Label store error: {0}")]
    Store(#[from] std::io::Error),
}
