/// Ratio between a font's point size and the pixel height of a line when no
/// explicit line height is configured.
const FONT_SIZE_TO_PIXELS: f64 = 1.5;

/// Line-height settings below this are multipliers, at or above it they are
/// absolute pixel values.
const MULTIPLIER_LIMIT: f64 = 8.0;

const EPSILON: f64 = 0.00001;

/// Height in pixels of one rendered line.
///
/// `line_height` follows the usual editor convention: `0` means "derive from
/// the font size", a small value scales the derived height and anything
/// larger is taken literally.
pub fn line_height_px(line_height: f64, font_size: f64) -> f64 {
    let font_px = (font_size * FONT_SIZE_TO_PIXELS - EPSILON).ceil();
    if line_height == 0.0 {
        font_px
    } else if line_height < MULTIPLIER_LIMIT {
        font_px * line_height
    } else {
        line_height
    }
}

/// Size of one monospace cell, in the renderer's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub char_width: f64,
    pub char_height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            char_width: 1.0,
            char_height: 14.0,
        }
    }
}

impl CellMetrics {
    /// Offset of a column from the left edge of the text area.
    pub fn x(&self, column: usize) -> f64 {
        self.char_width * column as f64
    }

    /// Offset of a line from the top of the viewport.
    pub fn y(&self, line: usize) -> f64 {
        self.char_height * line as f64
    }

    pub fn width(&self, columns: usize) -> f64 {
        self.char_width * columns as f64
    }

    pub fn height(&self, lines: usize) -> f64 {
        self.char_height * lines as f64
    }

    /// Nearest column for a horizontal pixel offset.
    pub fn column_at(&self, x: f64) -> usize {
        (x / self.char_width).round().max(0.0) as usize
    }

    /// Nearest line for a vertical pixel offset.
    pub fn line_at(&self, y: f64) -> usize {
        (y / self.char_height).round().max(0.0) as usize
    }
}
