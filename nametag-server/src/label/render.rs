//! Label rendering into the artifact store

use super::LabelError;
use super::layout::{CanvasMode, Composition, Layout, LayoutComposer, StackGap};
use super::measure::TextMeasurer;
use super::request::{
    DEFAULT_AUTO_FONT_SIZE, DEFAULT_FIXED_FONT_SIZE, LEGACY_CANVAS, LabelRequest, MAX_CANVAS_SIDE,
    MAX_FONT_SIZE, RenderedLabel, SizingMode,
};
use super::solver::{FontSizeSolver, FontSizes, legacy_quadratic_size};
use chrono::Utc;
use image::{Rgb, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Renderer tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Starting size of the auto-fit search
    pub auto_fit_max_font: u32,
    pub stack_gap: StackGap,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            auto_fit_max_font: 300,
            stack_gap: StackGap::Proportional,
        }
    }
}

/// Draws labels and writes them as PNG files
///
/// Cheap to clone; clones share the typeface and the artifact counter.
#[derive(Clone)]
pub struct LabelRenderer {
    measurer: TextMeasurer,
    output_dir: PathBuf,
    options: RenderOptions,
    sequence: Arc<AtomicU64>,
}

impl LabelRenderer {
    pub fn new(measurer: TextMeasurer, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            measurer,
            output_dir: output_dir.into(),
            options: RenderOptions::default(),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render `request` and store the image
    ///
    /// Blocking; call from a blocking-capable context.
    pub fn render(&self, request: &LabelRequest) -> Result<RenderedLabel, LabelError> {
        let (first, last) = request.validate()?;
        let (sizes, canvas) = self.resolve(request, &first, &last)?;

        let composer = LayoutComposer::new(&self.measurer, self.options.stack_gap);
        let composition = composer.compose(&first, &last, request.layout, sizes, canvas);
        debug!(
            width = composition.width,
            height = composition.height,
            font_size = sizes.primary,
            "Label composed"
        );
        if composition.width > MAX_CANVAS_SIDE || composition.height > MAX_CANVAS_SIDE {
            return Err(LabelError::Validation(format!(
                "label would be {}x{}, exceeding {} pixels per side",
                composition.width, composition.height, MAX_CANVAS_SIDE
            )));
        }

        let image = self.draw(&composition);

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(self.artifact_name(&first, &last));
        image.save(&path)?;

        info!(path = %path.display(), font_size = sizes.primary, "Label image saved");
        Ok(RenderedLabel {
            path,
            width: composition.width,
            height: composition.height,
            font_size_used: sizes.primary,
        })
    }

    fn resolve(
        &self,
        request: &LabelRequest,
        first: &str,
        last: &str,
    ) -> Result<(FontSizes, CanvasMode), LabelError> {
        match request.sizing_mode {
            SizingMode::Fixed => {
                let (width, height) = request.canvas.ok_or_else(|| {
                    LabelError::Validation("width and height are required for fixed sizing".to_string())
                })?;
                let size = request.font_size_hint.unwrap_or(DEFAULT_FIXED_FONT_SIZE);
                Ok((FontSizes::from_primary(size), CanvasMode::Fixed { width, height }))
            }
            SizingMode::AutoFit => {
                let fit = CanvasMode::FitContent {
                    padding: request.padding,
                };
                let Some(target) = request.canvas else {
                    let size = request.font_size_hint.unwrap_or(DEFAULT_AUTO_FONT_SIZE);
                    return Ok((FontSizes::from_primary(size), fit));
                };

                let solver = FontSizeSolver::new(&self.measurer, self.options.stack_gap);
                let max_size = request
                    .font_size_hint
                    .unwrap_or(self.options.auto_fit_max_font)
                    .min(MAX_FONT_SIZE);
                let sizes = match request.layout {
                    Layout::SideBySide => FontSizes::from_primary(solver.fit_single_line(
                        &format!("{} {}", first, last),
                        max_size,
                        target.0,
                        request.padding,
                    )),
                    Layout::Stacked => solver.fit_stacked(first, last, max_size, target, request.padding),
                };
                Ok((sizes, fit))
            }
            SizingMode::Legacy => {
                let size = legacy_quadratic_size(first, last) as u32;
                let (width, height) = request.canvas.unwrap_or(LEGACY_CANVAS);
                Ok((FontSizes::from_primary(size), CanvasMode::Fixed { width, height }))
            }
        }
    }

    fn draw(&self, composition: &Composition) -> RgbImage {
        let mut image = RgbImage::from_pixel(composition.width, composition.height, BACKGROUND);
        for run in &composition.runs {
            self.measurer
                .draw(&mut image, &run.text, run.font_size, run.x, run.y, INK);
        }
        image
    }

    /// `<FirstLast>-<UTC timestamp>-<counter>.png`
    fn artifact_name(&self, first: &str, last: &str) -> String {
        let mut stem: String = first
            .chars()
            .chain(last.chars())
            .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if stem.is_empty() {
            stem.push_str("label");
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}.png", stem, Utc::now().format("%Y%m%dT%H%M%SZ"), sequence)
    }
}
