//! Font size selection
//!
//! Three strategies:
//! - fixed: the caller's size is used as is
//! - auto-fit: descending search from a maximum until the text fits a target area
//! - legacy quadratic: size from the length of the longest name

use super::layout::StackGap;
use super::measure::TextMeasurer;

/// Decrement between auto-fit candidates
pub const SEARCH_STEP: u32 = 5;
/// Smallest size the search will try for the primary line
pub const PRIMARY_FLOOR: u32 = 10;
/// Smallest size of the secondary (last name) line in stacked layout
pub const SECONDARY_FLOOR: u32 = 8;
/// Secondary line size as a fraction of the primary size
pub const SECONDARY_RATIO: f32 = 0.8;
/// Names up to this many characters keep the legacy base size
pub const LEGACY_FREE_CHARS: usize = 8;
/// Legacy base size
pub const LEGACY_BASE_SIZE: f32 = 128.0;

/// Font sizes for the two lines of a label
///
/// Side-by-side layout only uses `primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizes {
    pub primary: u32,
    pub secondary: u32,
}

impl FontSizes {
    /// Sizes derived from one primary size
    pub fn from_primary(primary: u32) -> Self {
        Self {
            primary,
            secondary: secondary_size(primary),
        }
    }
}

/// Size of the secondary line for a primary size
pub fn secondary_size(primary: u32) -> u32 {
    ((primary as f32 * SECONDARY_RATIO) as u32).max(SECONDARY_FLOOR)
}

/// Legacy size curve: `128 - 12.32381·k + 0.552381·k²`, `k` = characters
/// of the longest name beyond eight
///
/// The curve is returned unclamped. It bottoms out around k = 11 and rises
/// again for longer names.
pub fn legacy_quadratic_size(first_name: &str, last_name: &str) -> f32 {
    let longest = first_name.chars().count().max(last_name.chars().count());
    let k = longest.saturating_sub(LEGACY_FREE_CHARS) as f32;
    LEGACY_BASE_SIZE - 12.32381 * k + 0.552381 * k * k
}

/// Searches for the largest size that fits a target area
pub struct FontSizeSolver<'a> {
    measurer: &'a TextMeasurer,
    gap: StackGap,
}

impl<'a> FontSizeSolver<'a> {
    pub fn new(measurer: &'a TextMeasurer, gap: StackGap) -> Self {
        Self { measurer, gap }
    }

    /// Largest size, stepping down from `max_size`, at which `text` is no
    /// wider than `target_width - 2 * padding`
    ///
    /// Stops at [`PRIMARY_FLOOR`] whether or not the text fits there.
    pub fn fit_single_line(&self, text: &str, max_size: u32, target_width: u32, padding: u32) -> u32 {
        let available = available(target_width, padding);
        let mut size = max_size.max(PRIMARY_FLOOR);

        loop {
            let extent = self.measurer.measure(text, size);
            if i64::from(extent.width) <= available || size <= PRIMARY_FLOOR {
                return size;
            }
            size = size.saturating_sub(SEARCH_STEP).max(PRIMARY_FLOOR);
        }
    }

    /// Largest primary size, stepping down from `max_size`, at which both
    /// lines fit the width and the stacked block fits the height
    ///
    /// The secondary size follows the primary at every step.
    pub fn fit_stacked(
        &self,
        first: &str,
        last: &str,
        max_size: u32,
        target: (u32, u32),
        padding: u32,
    ) -> FontSizes {
        let available_width = available(target.0, padding);
        let available_height = available(target.1, padding);
        let mut sizes = FontSizes::from_primary(max_size.max(PRIMARY_FLOOR));

        loop {
            let first_extent = self.measurer.measure(first, sizes.primary);
            let last_extent = self.measurer.measure(last, sizes.secondary);
            let block_height = i64::from(first_extent.height)
                + i64::from(self.gap.pixels(sizes.primary))
                + i64::from(last_extent.height);

            let fits = i64::from(first_extent.width) <= available_width
                && i64::from(last_extent.width) <= available_width
                && block_height <= available_height;

            if fits || sizes.primary <= PRIMARY_FLOOR {
                return sizes;
            }
            sizes = FontSizes::from_primary(sizes.primary.saturating_sub(SEARCH_STEP).max(PRIMARY_FLOOR));
        }
    }
}

fn available(extent: u32, padding: u32) -> i64 {
    i64::from(extent) - 2 * i64::from(padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(measurer: &TextMeasurer) -> FontSizeSolver<'_> {
        FontSizeSolver::new(measurer, StackGap::Proportional)
    }

    #[test]
    fn test_secondary_size() {
        assert_eq!(secondary_size(100), 80);
        assert_eq!(secondary_size(55), 44);
        assert_eq!(secondary_size(10), 8);
        assert_eq!(secondary_size(5), SECONDARY_FLOOR);
    }

    #[test]
    fn test_single_line_fits_at_max() {
        let measurer = TextMeasurer::builtin();
        // "Jo Li" at 100: 5 * 60 - 10 = 290
        assert_eq!(solver(&measurer).fit_single_line("Jo Li", 100, 400, 10), 100);
    }

    #[test]
    fn test_single_line_steps_down_to_fit() {
        let measurer = TextMeasurer::builtin();
        let size = solver(&measurer).fit_single_line("Jo Li", 300, 320, 10);

        let width = measurer.measure("Jo Li", size).width;
        assert!(width <= 300);
        // next step up would not have fit
        assert!(measurer.measure("Jo Li", size + SEARCH_STEP).width > 300);
        assert_eq!((300 - size) % SEARCH_STEP, 0);
    }

    #[test]
    fn test_single_line_stops_at_floor() {
        let measurer = TextMeasurer::builtin();
        let long = "Maximiliana Wolfeschlegelsteinhausenbergerdorff";
        assert_eq!(solver(&measurer).fit_single_line(long, 300, 50, 10), PRIMARY_FLOOR);
        // padding wider than the target
        assert_eq!(solver(&measurer).fit_single_line("Jo", 300, 10, 10), PRIMARY_FLOOR);
    }

    #[test]
    fn test_search_is_idempotent() {
        let measurer = TextMeasurer::builtin();
        let solver = solver(&measurer);

        let once = solver.fit_stacked("Grace", "Hopper", 300, (731, 300), 10);
        let twice = solver.fit_stacked("Grace", "Hopper", 300, (731, 300), 10);
        assert_eq!(once, twice);
        assert_eq!(
            solver.fit_single_line("Grace Hopper", 300, 731, 10),
            solver.fit_single_line("Grace Hopper", 300, 731, 10)
        );
    }

    #[test]
    fn test_stacked_fits_both_axes() {
        let measurer = TextMeasurer::builtin();
        let sizes = solver(&measurer).fit_stacked("Grace", "Hopper", 300, (731, 300), 10);

        assert_eq!(sizes.secondary, secondary_size(sizes.primary));
        let first = measurer.measure("Grace", sizes.primary);
        let last = measurer.measure("Hopper", sizes.secondary);
        assert!(first.width <= 711);
        assert!(last.width <= 711);
        assert!(first.height + sizes.primary / 10 + last.height <= 280);
    }

    #[test]
    fn test_stacked_stops_at_floors() {
        let measurer = TextMeasurer::builtin();
        let sizes = solver(&measurer).fit_stacked("Bartholomew", "Featherstonehaugh", 300, (40, 20), 5);

        assert_eq!(sizes, FontSizes { primary: PRIMARY_FLOOR, secondary: SECONDARY_FLOOR });
    }

    #[test]
    fn test_stacked_fixed_gap_counts_in_height() {
        let measurer = TextMeasurer::builtin();
        let proportional = FontSizeSolver::new(&measurer, StackGap::Proportional)
            .fit_stacked("Jo", "Li", 300, (1000, 200), 0);
        let wide_gap = FontSizeSolver::new(&measurer, StackGap::Fixed(60))
            .fit_stacked("Jo", "Li", 300, (1000, 200), 0);

        assert!(wide_gap.primary < proportional.primary);
    }

    #[test]
    fn test_legacy_quadratic_size() {
        assert_eq!(legacy_quadratic_size("Jo", "Li"), LEGACY_BASE_SIZE);
        assert_eq!(legacy_quadratic_size("Benedict", "Li"), LEGACY_BASE_SIZE);

        // k = 1
        let size = legacy_quadratic_size("Alexandra", "Li");
        assert!((size - (128.0 - 12.32381 + 0.552381)).abs() < 1e-3);

        // longest name wins
        assert_eq!(
            legacy_quadratic_size("Jo", "Alexandra"),
            legacy_quadratic_size("Alexandra", "Jo")
        );
    }

    #[test]
    fn test_legacy_quadratic_is_not_monotonic() {
        let at = |k: usize| legacy_quadratic_size(&"x".repeat(LEGACY_FREE_CHARS + k), "");

        assert!(at(11) < at(5));
        // past the vertex the curve grows again
        assert!(at(30) > at(11));
        assert!(at(30) > LEGACY_BASE_SIZE);
        // the minimum stays above zero
        assert!(at(11) > 59.0 && at(11) < 60.0);
    }
}
