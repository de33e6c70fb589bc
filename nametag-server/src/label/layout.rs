//! Placement of name lines on a canvas

use super::measure::{TextExtent, TextMeasurer};
use super::solver::FontSizes;
use serde::{Deserialize, Serialize};

/// How first and last name are arranged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One line, `"first last"`
    #[default]
    SideBySide,
    /// First name above last name
    Stacked,
}

/// Vertical gap between stacked lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackGap {
    /// `font_size / 10` of the primary line
    #[default]
    Proportional,
    /// Constant pixel gap
    Fixed(u32),
}

impl StackGap {
    /// Parse `proportional` or a pixel count
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("proportional") {
            return Some(Self::Proportional);
        }
        value.parse().ok().map(Self::Fixed)
    }

    /// Gap in pixels for a primary font size
    pub fn pixels(&self, primary_size: u32) -> u32 {
        match self {
            Self::Proportional => primary_size / 10,
            Self::Fixed(pixels) => *pixels,
        }
    }
}

/// How the canvas size is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    /// Given dimensions, text block centered on both axes
    Fixed { width: u32, height: u32 },
    /// Canvas sized to the text plus `padding` on every side
    FitContent { padding: u32 },
}

/// One line of text and where its ink box goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub font_size: u32,
    pub x: i32,
    pub y: i32,
    pub extent: TextExtent,
}

/// Canvas dimensions and the runs to draw on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub width: u32,
    pub height: u32,
    pub runs: Vec<TextRun>,
}

/// Computes draw positions for a name pair
pub struct LayoutComposer<'a> {
    measurer: &'a TextMeasurer,
    gap: StackGap,
}

impl<'a> LayoutComposer<'a> {
    pub fn new(measurer: &'a TextMeasurer, gap: StackGap) -> Self {
        Self { measurer, gap }
    }

    pub fn compose(
        &self,
        first: &str,
        last: &str,
        layout: Layout,
        sizes: FontSizes,
        canvas: CanvasMode,
    ) -> Composition {
        match layout {
            Layout::SideBySide => self.compose_single_line(&format!("{} {}", first, last), sizes.primary, canvas),
            Layout::Stacked => self.compose_stacked(first, last, sizes, canvas),
        }
    }

    fn compose_single_line(&self, text: &str, size: u32, canvas: CanvasMode) -> Composition {
        let extent = self.measurer.measure(text, size);
        let (width, height) = canvas_size(canvas, extent.width, extent.height);

        Composition {
            width,
            height,
            runs: vec![TextRun {
                text: text.to_string(),
                font_size: size,
                x: centered(width, extent.width),
                y: centered(height, extent.height),
                extent,
            }],
        }
    }

    fn compose_stacked(&self, first: &str, last: &str, sizes: FontSizes, canvas: CanvasMode) -> Composition {
        let first_extent = self.measurer.measure(first, sizes.primary);
        let last_extent = self.measurer.measure(last, sizes.secondary);
        let gap = self.gap.pixels(sizes.primary);

        let block_width = first_extent.width.max(last_extent.width);
        let block_height = first_extent
            .height
            .saturating_add(gap)
            .saturating_add(last_extent.height);
        let (width, height) = canvas_size(canvas, block_width, block_height);

        let top = centered(height, block_height);
        let second_top = top.saturating_add(offset(first_extent.height.saturating_add(gap)));

        Composition {
            width,
            height,
            runs: vec![
                TextRun {
                    text: first.to_string(),
                    font_size: sizes.primary,
                    x: centered(width, first_extent.width),
                    y: top,
                    extent: first_extent,
                },
                TextRun {
                    text: last.to_string(),
                    font_size: sizes.secondary,
                    x: centered(width, last_extent.width),
                    y: second_top,
                    extent: last_extent,
                },
            ],
        }
    }
}

fn canvas_size(canvas: CanvasMode, content_width: u32, content_height: u32) -> (u32, u32) {
    match canvas {
        CanvasMode::Fixed { width, height } => (width, height),
        CanvasMode::FitContent { padding } => {
            let margin = padding.saturating_mul(2);
            (
                content_width.saturating_add(margin).max(1),
                content_height.saturating_add(margin).max(1),
            )
        }
    }
}

fn offset(pixels: u32) -> i32 {
    i32::try_from(pixels).unwrap_or(i32::MAX)
}

/// Offset that centers `inner` in `outer`; negative when the content overflows
fn centered(outer: u32, inner: u32) -> i32 {
    let shift = (i64::from(outer) - i64::from(inner)).div_euclid(2);
    shift.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
