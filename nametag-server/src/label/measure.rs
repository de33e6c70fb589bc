//! Typeface loading, text measurement and text drawing
//!
//! Measurements follow the ink bounding box of the rendered string with the
//! pen origin at the top-left of the line (ascender on the origin row), so
//! `left`/`top` say how far the ink starts from the pen origin.

use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Ink bounding box of a string at a given size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
    /// Horizontal offset of the ink from the pen origin
    pub left: i32,
    /// Vertical offset of the ink from the pen origin
    pub top: i32,
}

/// Where the loaded typeface came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    File(PathBuf),
    Builtin,
}

enum Face {
    Outline(Font<'static>),
    /// Fixed-pitch block glyphs, always available
    Builtin,
}

/// Measures and draws text with one typeface
#[derive(Clone)]
pub struct TextMeasurer {
    face: Arc<Face>,
    source: FontSource,
}

impl TextMeasurer {
    /// Load the first usable typeface from `candidates`
    ///
    /// Falls back to the built-in face when no candidate can be read or
    /// parsed, so this never fails.
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            match std::fs::read(path) {
                Ok(data) => match Font::try_from_vec(data) {
                    Some(font) => {
                        info!(font = %path.display(), "Loaded typeface");
                        return Self {
                            face: Arc::new(Face::Outline(font)),
                            source: FontSource::File(path.clone()),
                        };
                    }
                    None => warn!(font = %path.display(), "Unparseable font file, skipping"),
                },
                Err(e) => warn!(font = %path.display(), error = %e, "Font not available, skipping"),
            }
        }

        warn!("No typeface found, using built-in block glyphs");
        Self::builtin()
    }

    /// The built-in fixed-pitch face
    pub fn builtin() -> Self {
        Self {
            face: Arc::new(Face::Builtin),
            source: FontSource::Builtin,
        }
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// Ink extent of `text` at `size` pixels
    pub fn measure(&self, text: &str, size: u32) -> TextExtent {
        match self.face.as_ref() {
            Face::Outline(font) => outline_extent(font, text, size),
            Face::Builtin => BlockMetrics::new(size).extent(text),
        }
    }

    /// Draw `text` so that its ink box starts at (`x`, `y`)
    pub fn draw(&self, canvas: &mut RgbImage, text: &str, size: u32, x: i32, y: i32, color: Rgb<u8>) {
        let extent = self.measure(text, size);
        let origin_x = x - extent.left;
        let origin_y = y - extent.top;

        match self.face.as_ref() {
            Face::Outline(font) => draw_outline(canvas, font, text, size, origin_x, origin_y, color),
            Face::Builtin => {
                let metrics = BlockMetrics::new(size);
                for (index, ch) in text.chars().enumerate() {
                    if ch.is_whitespace() {
                        continue;
                    }
                    let cell_x = origin_x + index as i32 * metrics.advance as i32;
                    fill_rect(
                        canvas,
                        cell_x,
                        origin_y,
                        metrics.advance - metrics.spacing,
                        metrics.cap_height,
                        color,
                    );
                }
            }
        }
    }
}

/// Ordered typeface candidates: the bundled font, then common system fonts
pub fn font_candidates(bundled: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![bundled.to_path_buf()];

    let system: &[&str] = if cfg!(windows) {
        &["C:\\Windows\\Fonts\\arialbd.ttf", "C:\\Windows\\Fonts\\Arial.ttf"]
    } else if cfg!(target_os = "macos") {
        &[
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        ]
    };

    candidates.extend(system.iter().map(PathBuf::from));
    candidates
}

fn outline_extent(font: &Font<'static>, text: &str, size: u32) -> TextExtent {
    let scale = Scale::uniform(size as f32);
    let v_metrics = font.v_metrics(scale);

    let mut bounds: Option<(i32, i32, i32, i32)> = None;
    for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            bounds = Some(match bounds {
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                Some((l, t, r, b)) => (
                    l.min(bb.min.x),
                    t.min(bb.min.y),
                    r.max(bb.max.x),
                    b.max(bb.max.y),
                ),
            });
        }
    }

    match bounds {
        Some((left, top, right, bottom)) => TextExtent {
            width: (right - left) as u32,
            height: (bottom - top) as u32,
            left,
            top,
        },
        None => TextExtent::default(),
    }
}

fn draw_outline(
    canvas: &mut RgbImage,
    font: &Font<'static>,
    text: &str,
    size: u32,
    origin_x: i32,
    origin_y: i32,
    color: Rgb<u8>,
) {
    let scale = Scale::uniform(size as f32);
    let v_metrics = font.v_metrics(scale);
    let start = point(origin_x as f32, origin_y as f32 + v_metrics.ascent);

    for glyph in font.layout(text, scale, start) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px as u32 >= canvas.width() || py as u32 >= canvas.height() {
                return;
            }
            let alpha = coverage.clamp(0.0, 1.0);
            if alpha == 0.0 {
                return;
            }
            let dst = canvas.get_pixel_mut(px as u32, py as u32);
            for channel in 0..3 {
                let blended = color.0[channel] as f32 * alpha + dst.0[channel] as f32 * (1.0 - alpha);
                dst.0[channel] = blended.round() as u8;
            }
        });
    }
}

/// Geometry of the built-in face at one size
#[derive(Debug, Clone, Copy)]
struct BlockMetrics {
    advance: u32,
    spacing: u32,
    cap_height: u32,
}

impl BlockMetrics {
    fn new(size: u32) -> Self {
        let advance = scaled(size, 3, 5).max(2);
        Self {
            advance,
            spacing: (advance / 6).max(1),
            cap_height: scaled(size, 7, 10).max(1),
        }
    }

    fn extent(&self, text: &str) -> TextExtent {
        let inked: Vec<usize> = text
            .chars()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .map(|(index, _)| index)
            .collect();

        let (Some(first), Some(last)) = (inked.first(), inked.last()) else {
            return TextExtent::default();
        };

        let cell = |index: usize| (index as u32).saturating_mul(self.advance);
        let left = cell(*first);
        let right = cell(*last).saturating_add(self.advance - self.spacing);
        TextExtent {
            width: right - left,
            height: self.cap_height,
            left: i32::try_from(left).unwrap_or(i32::MAX),
            top: 0,
        }
    }
}

/// `size * num / den` without intermediate overflow
fn scaled(size: u32, num: u64, den: u64) -> u32 {
    (u64::from(size) * num / den) as u32
}

fn fill_rect(canvas: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x + width as i32).max(0) as u32).min(canvas.width());
    let y1 = ((y + height as i32).max(0) as u32).min(canvas.height());

    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// First system typeface from the candidate list, `None` when none is installed
    pub fn system_measurer() -> Option<TextMeasurer> {
        let system: Vec<PathBuf> = font_candidates(Path::new("")).into_iter().skip(1).collect();
        let measurer = TextMeasurer::load(&system);
        match measurer.source() {
            FontSource::File(_) => Some(measurer),
            FontSource::Builtin => {
                eprintln!("no system typeface installed, skipping");
                None
            }
        }
    }

    /// `(left, top, right, bottom)` of every non-white pixel, right/bottom exclusive
    pub fn ink_bounds(image: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel.0 == [255, 255, 255] {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
            });
        }
        bounds
    }
}
