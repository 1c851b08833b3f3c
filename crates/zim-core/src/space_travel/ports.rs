//! Capabilities the navigator needs from its host editor.

use super::region::Direction;

/// Read access to the lines currently on screen.
pub trait ViewportMetrics {
    /// Absolute indices of the first and last visible lines (inclusive).
    fn visible_line_range(&self) -> (usize, usize);

    /// Column of the first non-whitespace character of `line`.
    fn line_indent(&self, line: usize) -> usize;

    /// Column just past the last character of `line`.
    fn line_end_column(&self, line: usize) -> usize;
}

/// Write access to the primary cursor.
pub trait CursorSink {
    /// Current `(line, column)` of the cursor.
    fn current_position(&self) -> (usize, usize);

    /// Replace all selections with a single empty one at `(line, column)`.
    /// Hosts may snap `column` back to the end of a shorter line, so after a
    /// bisect the cursor line is always inside the box but the column may not
    /// be.
    fn set_collapsed_selection(&mut self, line: usize, column: usize);

    /// Move the cursor `units` steps, as an arrow key would.
    fn translate_cursor(&mut self, direction: Direction, units: usize);
}
