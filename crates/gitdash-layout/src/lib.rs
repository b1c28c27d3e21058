#![forbid(unsafe_code)]

//! Modal panel sizing.
//!
//! Pure functions that turn a content string and a screen size into the
//! [`Bounds`] a modal panel occupies. There is no state here: the panel
//! controller calls [`compute_bounds`] when a panel opens, [`newline_bounds`]
//! just before a structural newline is inserted into an editable panel, and
//! [`fit_height`] after every edit.
//!
//! # Sizing rules
//!
//! - The panel is half the screen wide and horizontally centered:
//!   `x0 = W/2 - pw/2`, `x1 = W/2 + pw/2`.
//! - Every line of content takes `len(line) / pw + 1` rows, so a line that
//!   exactly fills a row still reserves a second one for the cursor.
//! - Vertically, `y0 = H/2 - R/2 - R%2 - 1` and `y1 = H/2 + R/2`. The
//!   `- R%2 - 1` bias keeps odd-height panels from sitting low; golden
//!   snapshots depend on it.
//!
//! All divisions are integer divisions on non-negative operands.
//!
//! # Example
//!
//! ```
//! use gitdash_core::geometry::{Bounds, ScreenSize};
//! use gitdash_layout::{compute_bounds, required_rows};
//!
//! assert_eq!(required_rows("hello\nworld12345678", 10), 3);
//!
//! let bounds = compute_bounds("Discard all changes?", ScreenSize::new(80, 40));
//! assert_eq!(bounds, Bounds::new(20, 18, 60, 20));
//! ```

use gitdash_core::geometry::{Bounds, ScreenSize};
use unicode_width::UnicodeWidthStr;

/// Rows reserved at the bottom of the screen for the status line.
pub const STATUS_ROWS: u16 = 2;

/// Width of a modal panel for a screen of the given width.
#[inline]
pub const fn panel_width(screen_width: u16) -> i32 {
    (screen_width / 2) as i32
}

/// Width of a single line in terminal cells.
#[inline]
pub fn line_width(line: &str) -> usize {
    UnicodeWidthStr::width(line)
}

/// Display rows needed to show `content` wrapped at `panel_width` columns.
///
/// Each `\n`-separated line contributes `len(line) / panel_width + 1` rows.
/// An empty line still takes one row. A non-positive width cannot wrap
/// anything, so each line counts as a single row.
pub fn required_rows(content: &str, panel_width: i32) -> i32 {
    content
        .split('\n')
        .map(|line| {
            if panel_width <= 0 {
                return 1;
            }
            let width = i64::try_from(line_width(line)).unwrap_or(i64::MAX);
            let rows = width / i64::from(panel_width) + 1;
            i32::try_from(rows).unwrap_or(i32::MAX)
        })
        .fold(0i32, i32::saturating_add)
}

/// Top and bottom edges for a panel of `rows` rows on a screen `screen_height` tall.
#[inline]
pub const fn center_rows(screen_height: u16, rows: i32) -> (i32, i32) {
    let half = (screen_height / 2) as i32;
    let top = half - rows / 2 - rows % 2 - 1;
    let bottom = half + rows / 2;
    (top, bottom)
}

/// Left and right edges for a panel on a screen `screen_width` wide.
#[inline]
pub const fn center_columns(screen_width: u16) -> (i32, i32) {
    let half = (screen_width / 2) as i32;
    let pw = panel_width(screen_width);
    (half - pw / 2, half + pw / 2)
}

/// Bounds for a modal panel showing `content`.
pub fn compute_bounds(content: &str, screen: ScreenSize) -> Bounds {
    let rows = required_rows(content, panel_width(screen.width));
    let (x0, x1) = center_columns(screen.width);
    let (y0, y1) = center_rows(screen.height, rows);
    Bounds::new(x0, y0, x1, y1)
}

/// Bounds to apply just before inserting a structural newline.
///
/// Sized for the current content plus one extra row at the bottom, so the
/// cursor's new line is never hidden under the bottom edge.
pub fn newline_bounds(content: &str, screen: ScreenSize) -> Bounds {
    compute_bounds(content, screen).extend_bottom(1)
}

/// Height-only refit for a panel whose content is being edited.
///
/// Recomputes the vertical extent for `content` while keeping the horizontal
/// extent of `current`. A trailing `\n` is a real, empty last line and keeps
/// its row. Returns `None` when nothing would change, so calling this twice
/// with the same content mutates nothing.
pub fn fit_height(current: Bounds, content: &str, screen: ScreenSize) -> Option<Bounds> {
    let fresh = compute_bounds(content, screen);
    let next = current.with_rows(fresh.y0, fresh.y1);
    (next != current).then_some(next)
}

/// Regions of the base dashboard: the main list and the status line under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardRegions {
    /// Main (action list) panel.
    pub main: Bounds,
    /// Single-row status line along the bottom.
    pub status: Bounds,
}

/// Split the screen into the main panel and the status line.
pub fn dashboard_regions(screen: ScreenSize) -> DashboardRegions {
    let right = i32::from(screen.width) - 1;
    let bottom = i32::from(screen.height) - 1;
    let status_top = (bottom - i32::from(STATUS_ROWS) + 1).max(0);
    DashboardRegions {
        main: Bounds::new(0, 0, right, (status_top - 1).max(0)),
        status: Bounds::new(0, status_top, right, bottom.max(status_top)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_for_documented_example() {
        // 5/10+1 = 1, 18/10+1 = 2
        assert_eq!(required_rows("hello\nworld12345678", 10), 3);
    }

    #[test]
    fn empty_content_takes_one_row() {
        assert_eq!(required_rows("", 40), 1);
        assert_eq!(required_rows("\n", 40), 2);
    }

    #[test]
    fn exact_fill_reserves_extra_row() {
        assert_eq!(required_rows("0123456789", 10), 2);
        assert_eq!(required_rows("012345678", 10), 1);
    }

    #[test]
    fn zero_width_counts_lines() {
        assert_eq!(required_rows("abc\ndef", 0), 2);
    }

    #[test]
    fn wide_glyphs_count_cells() {
        // Four CJK glyphs are eight cells wide.
        assert_eq!(required_rows("漢字漢字", 8), 2);
        assert_eq!(required_rows("漢字漢字", 9), 1);
    }

    #[test]
    fn vertical_centering_example() {
        assert_eq!(center_rows(40, 3), (17, 21));
    }

    #[test]
    fn vertical_centering_even_rows() {
        // 20 - 1 - 0 - 1 = 18, 20 + 1 = 21
        assert_eq!(center_rows(40, 2), (18, 21));
    }

    #[test]
    fn short_screen_goes_negative() {
        let (top, bottom) = center_rows(4, 9);
        assert_eq!(top, 2 - 4 - 1 - 1);
        assert_eq!(bottom, 2 + 4);
    }

    #[test]
    fn bounds_for_single_line() {
        let b = compute_bounds("", ScreenSize::new(80, 24));
        assert_eq!(b, Bounds::new(20, 10, 60, 12));
    }

    #[test]
    fn odd_screen_width() {
        // pw = 40, half = 40
        let b = compute_bounds("x", ScreenSize::new(81, 24));
        assert_eq!((b.x0, b.x1), (20, 60));
    }

    #[test]
    fn newline_bounds_add_one_row() {
        let screen = ScreenSize::new(80, 24);
        let base = compute_bounds("line", screen);
        assert_eq!(newline_bounds("line", screen), base.extend_bottom(1));
    }

    #[test]
    fn fit_height_is_idempotent() {
        let screen = ScreenSize::new(80, 24);
        let current = compute_bounds("one", screen);
        assert_eq!(fit_height(current, "one", screen), None);

        let grown = fit_height(current, "one\ntwo", screen).expect("panel should grow");
        assert_eq!(fit_height(grown, "one\ntwo", screen), None);
    }

    #[test]
    fn fit_height_keeps_horizontal_extent() {
        let screen = ScreenSize::new(80, 24);
        let current = Bounds::new(3, 10, 77, 12);
        let next = fit_height(current, "a\nb\nc", screen).expect("height changes");
        assert_eq!((next.x0, next.x1), (3, 77));
    }

    #[test]
    fn fit_height_keeps_row_for_trailing_newline() {
        let screen = ScreenSize::new(80, 24);
        let grown = newline_bounds("abc", screen);
        assert_eq!(fit_height(grown, "abc\n", screen), None);
        assert_eq!(grown.height(), compute_bounds("abc\n", screen).height());
    }

    #[test]
    fn dashboard_regions_split() {
        let regions = dashboard_regions(ScreenSize::new(80, 24));
        assert_eq!(regions.main, Bounds::new(0, 0, 79, 21));
        assert_eq!(regions.status, Bounds::new(0, 22, 79, 23));
    }
}
