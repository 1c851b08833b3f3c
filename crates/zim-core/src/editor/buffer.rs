use unicode_width::UnicodeWidthChar;

/// Tabs are expanded to this many spaces when text is loaded.
pub const TAB_WIDTH: usize = 4;

/// A multi-line text buffer with a 2D cursor.
///
/// Lines are stored as `Vec<String>`, where each string is one line of text
/// (without trailing newline). The cursor is tracked as (row, col) where col
/// is a byte offset into the current line.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    /// Desired display column for vertical movement (sticky column).
    pub desired_col: usize,
    /// Whether the buffer has been modified since last save.
    pub dirty: bool,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            desired_col: 0,
            dirty: false,
        }
    }

    /// Create a buffer from a string. Tabs become spaces.
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text
            .lines()
            .map(|l| l.replace('\t', &" ".repeat(TAB_WIDTH)))
            .collect();
        // Ensure at least one line
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            ..Self::new()
        }
    }

    /// Get the full text as a single string with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get the current line.
    pub fn current_line(&self) -> &str {
        &self.lines[self.cursor_row]
    }

    /// Get the length (in bytes) of the current line.
    pub fn current_line_len(&self) -> usize {
        self.lines[self.cursor_row].len()
    }

    // ── Columns ──────────────────────────────────────────────────────

    /// Display column of the cursor.
    pub fn cursor_display_col(&self) -> usize {
        display_width(&self.current_line()[..self.cursor_col])
    }

    /// Place the cursor at a display column of `row`, clamped to the
    /// buffer and to the end of the line.
    pub fn set_cursor(&mut self, row: usize, display_col: usize) {
        self.cursor_row = row.min(self.lines.len() - 1);
        self.cursor_col = byte_at_column(&self.lines[self.cursor_row], display_col);
        self.desired_col = display_col;
    }

    // ── Basic cursor movement ────────────────────────────────────────

    /// Move cursor left by one character.
    pub fn cursor_left(&mut self) {
        if self.cursor_col > 0 {
            let line = &self.lines[self.cursor_row];
            self.cursor_col = line[..self.cursor_col]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.desired_col = self.cursor_display_col();
        }
    }

    /// Move cursor right by one character.
    pub fn cursor_right(&mut self) {
        let line_len = self.current_line_len();
        if self.cursor_col < line_len {
            let line = &self.lines[self.cursor_row];
            self.cursor_col = line[self.cursor_col..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_col + i)
                .unwrap_or(line_len);
            self.desired_col = self.cursor_display_col();
        }
    }

    /// Move cursor up by one line, preserving desired column.
    pub fn cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = byte_at_column(&self.lines[self.cursor_row], self.desired_col);
        }
    }

    /// Move cursor down by one line, preserving desired column.
    pub fn cursor_down(&mut self) {
        if self.cursor_row < self.lines.len() - 1 {
            self.cursor_row += 1;
            self.cursor_col = byte_at_column(&self.lines[self.cursor_row], self.desired_col);
        }
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        if c == '\t' {
            for _ in 0..TAB_WIDTH {
                self.insert_char(' ');
            }
            return;
        }
        self.lines[self.cursor_row].insert(self.cursor_col, c);
        self.cursor_col += c.len_utf8();
        self.desired_col = self.cursor_display_col();
        self.dirty = true;
    }

    /// Insert a newline at the cursor position, splitting the current line.
    pub fn insert_newline(&mut self) {
        let after = self.lines[self.cursor_row].split_off(self.cursor_col);
        self.lines.insert(self.cursor_row + 1, after);
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.desired_col = 0;
        self.dirty = true;
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_left();
            self.lines[self.cursor_row].remove(self.cursor_col);
            self.dirty = true;
        } else if self.cursor_row > 0 {
            // Merge with previous line
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
            self.lines[self.cursor_row].push_str(&current);
            self.desired_col = self.cursor_display_col();
            self.dirty = true;
        }
    }

    /// Delete the character at the cursor (delete key).
    pub fn delete_char_at_cursor(&mut self) {
        let line_len = self.current_line_len();
        if self.cursor_col < line_len {
            self.lines[self.cursor_row].remove(self.cursor_col);
            self.dirty = true;
        } else if self.cursor_row < self.lines.len() - 1 {
            // Merge next line into current
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
            self.dirty = true;
        }
    }
}

/// Width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Display column of the first non-whitespace character. Blank lines report
/// their full width.
pub fn indent_width(line: &str) -> usize {
    let trimmed = line.trim_start();
    display_width(&line[..line.len() - trimmed.len()])
}

/// Byte offset of the character at `column`, or the line length if the line
/// is shorter. A column inside a wide character snaps to its start.
pub fn byte_at_column(line: &str, column: usize) -> usize {
    let mut width = 0;
    for (i, c) in line.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > column {
            return i;
        }
        width += w;
    }
    line.len()
}
