pub mod buffer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buffer::{TextBuffer, display_width, indent_width};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::mode::{CursorShape, EditMode, ModeSink};
use crate::settings::EditorSettings;
use crate::space_travel::{
    Direction, SpaceNavigator,
    overlay::{Guide, OverlayRenderer, OverlaySpec},
    ports::{CursorSink, ViewportMetrics},
};

// ── Document ─────────────────────────────────────────────────────────

/// A text buffer and the window of it that is on screen.
#[derive(Debug)]
pub struct Document {
    pub buffer: TextBuffer,
    scroll_offset: usize,
    /// Visible height (updated each render).
    visible_height: usize,
}

impl Document {
    pub fn new(buffer: TextBuffer) -> Self {
        Self {
            buffer,
            scroll_offset: 0,
            visible_height: 20,
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_height(&self) -> usize {
        self.visible_height
    }

    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height.max(1);
        self.scroll_to_cursor();
    }

    /// Scroll just enough to keep the cursor on screen.
    pub fn scroll_to_cursor(&mut self) {
        let row = self.buffer.cursor_row;
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + self.visible_height {
            self.scroll_offset = row + 1 - self.visible_height;
        }
    }
}

impl ViewportMetrics for Document {
    fn visible_line_range(&self) -> (usize, usize) {
        let end = (self.scroll_offset + self.visible_height).min(self.buffer.line_count());
        (self.scroll_offset, end.saturating_sub(1).max(self.scroll_offset))
    }

    fn line_indent(&self, line: usize) -> usize {
        indent_width(&self.buffer.lines[line])
    }

    fn line_end_column(&self, line: usize) -> usize {
        display_width(&self.buffer.lines[line])
    }
}

impl CursorSink for Document {
    fn current_position(&self) -> (usize, usize) {
        (self.buffer.cursor_row, self.buffer.cursor_display_col())
    }

    fn set_collapsed_selection(&mut self, line: usize, column: usize) {
        self.buffer.set_cursor(line, column);
        self.scroll_to_cursor();
    }

    fn translate_cursor(&mut self, direction: Direction, units: usize) {
        for _ in 0..units {
            match direction {
                Direction::Up => self.buffer.cursor_up(),
                Direction::Down => self.buffer.cursor_down(),
                Direction::Left => self.buffer.cursor_left(),
                Direction::Right => self.buffer.cursor_right(),
            }
        }
        self.scroll_to_cursor();
    }
}

// ── Overlay layer ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayId(u64);

/// Terminal renderer for travel overlays. Specs are kept until cleared and
/// painted over the text on every frame.
#[derive(Debug, Default)]
pub struct OverlayLayer {
    next_id: u64,
    live: Vec<(OverlayId, OverlaySpec)>,
}

impl OverlayRenderer for OverlayLayer {
    type Handle = OverlayId;

    fn create_overlay(&mut self, spec: &OverlaySpec) -> OverlayId {
        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.live.push((id, spec.clone()));
        id
    }

    fn clear_overlay(&mut self, handle: OverlayId) {
        self.live.retain(|(id, _)| *id != handle);
    }
}

impl OverlayLayer {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn specs(&self) -> impl Iterator<Item = &OverlaySpec> {
        self.live.iter().map(|(_, spec)| spec)
    }

    /// Paint every live overlay onto `buf`. `text_area` is where line
    /// `scroll_offset` is drawn.
    pub fn render(&self, buf: &mut Buffer, text_area: Rect, scroll_offset: usize) {
        let box_style = Style::default().bg(Color::Rgb(40, 44, 64));
        let vertical_style = Style::default().bg(Color::Rgb(72, 78, 120));
        let horizontal_style = Style::default().add_modifier(Modifier::UNDERLINED);

        for spec in self.specs() {
            let m = spec.metrics;
            // Overlay rows are relative to the line the spec was drawn for.
            let to_screen = |row: usize| (spec.first_line + row).checked_sub(scroll_offset);

            let Some(top) = to_screen(m.line_at(spec.bounds.top)) else {
                continue;
            };
            let left = m.column_at(spec.bounds.left);
            let width = m.column_at(spec.bounds.width);
            let height = m.line_at(spec.bounds.height);
            buf.set_style(cell_rect(text_area, left, top, width, height), box_style);

            for guide in &spec.guides {
                match *guide {
                    Guide::Vertical {
                        left, top, height, ..
                    } => {
                        if let Some(row) = to_screen(m.line_at(top)) {
                            let rect = cell_rect(text_area, m.column_at(left), row, 1, m.line_at(height));
                            buf.set_style(rect, vertical_style);
                        }
                    }
                    Guide::Horizontal {
                        anchor_line,
                        left,
                        top,
                        width,
                        ..
                    } => {
                        // Underline the last row of the upper half.
                        let midline = anchor_line + m.line_at(top);
                        if let Some(row) = to_screen(midline.saturating_sub(1)) {
                            let rect = cell_rect(text_area, m.column_at(left), row, m.column_at(width), 1);
                            buf.set_style(rect, horizontal_style);
                        }
                    }
                }
            }
        }
    }
}

/// Cell rectangle inside `area`, clipped to it.
fn cell_rect(area: Rect, column: usize, row: usize, width: usize, height: usize) -> Rect {
    let clamp = |v: usize| u16::try_from(v).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(clamp(column));
    let y = area.y.saturating_add(clamp(row));
    Rect::new(x, y, clamp(width), clamp(height)).intersection(area)
}

// ── Decorations ──────────────────────────────────────────────────────

/// What the mode manager last told this view to show.
#[derive(Debug, Clone, Default)]
pub struct ViewDecorations {
    pub cursor_shape: CursorShape,
    pub status_text: String,
    pub mode_flag: EditMode,
}

impl ModeSink for ViewDecorations {
    fn set_cursor_shape(&mut self, shape: CursorShape) {
        self.cursor_shape = shape;
    }

    fn set_status_text(&mut self, text: &str) {
        self.status_text = text.to_string();
    }

    fn set_mode_flag(&mut self, mode: EditMode) {
        self.mode_flag = mode;
    }
}

// ── EditorView ───────────────────────────────────────────────────────

/// One open document: text, cursor, travel state and overlay.
pub struct EditorView {
    pub doc: Document,
    pub path: Option<PathBuf>,
    pub decorations: ViewDecorations,
    navigator: SpaceNavigator<OverlayId>,
    overlays: OverlayLayer,
}

impl EditorView {
    pub fn new(buffer: TextBuffer) -> Self {
        Self {
            doc: Document::new(buffer),
            path: None,
            decorations: ViewDecorations::default(),
            navigator: SpaceNavigator::new(),
            overlays: OverlayLayer::default(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(TextBuffer::from_text(text))
    }

    /// Open `path`, or start an empty buffer for it if it doesn't exist.
    pub fn open(path: &Path) -> Result<Self> {
        let buffer = match std::fs::read_to_string(path) {
            Ok(text) => TextBuffer::from_text(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                TextBuffer::new()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let mut view = Self::new(buffer);
        view.path = Some(path.to_path_buf());
        Ok(view)
    }

    /// Write the buffer to `path`, or to the view's own path. The view adopts
    /// `path` if it had none.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let target = path
            .or(self.path.as_deref())
            .map(Path::to_path_buf)
            .context("No file name")?;
        let mut text = self.doc.buffer.text();
        text.push('\n');
        std::fs::write(&target, text)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        self.doc.buffer.dirty = false;
        if self.path.is_none() {
            self.path = Some(target.clone());
        }
        tracing::info!(path = %target.display(), lines = self.doc.buffer.line_count(), "saved");
        Ok(target)
    }

    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "[scratch]".to_string())
    }

    pub fn is_dirty(&self) -> bool {
        self.doc.buffer.dirty
    }

    pub fn navigator(&self) -> &SpaceNavigator<OverlayId> {
        &self.navigator
    }

    pub fn overlays(&self) -> &OverlayLayer {
        &self.overlays
    }

    pub fn is_travelling(&self) -> bool {
        self.navigator.is_active()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn configure(&mut self, settings: &EditorSettings) {
        self.navigator.reconfigure(
            settings.line_height,
            settings.font_size,
            settings.char_width,
            settings.guide_offset,
            &mut self.overlays,
        );
    }

    pub fn toggle_space_travel(&mut self) {
        self.navigator.toggle_travel(&self.doc, &mut self.overlays);
    }

    pub fn stop_space_travel(&mut self) {
        self.navigator.stop_travel(&mut self.overlays);
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        self.navigator
            .handle_move(direction, &mut self.doc, &mut self.overlays);
    }

    pub fn insert_char(&mut self, c: char) {
        self.doc.buffer.insert_char(c);
        self.doc.scroll_to_cursor();
    }

    pub fn insert_newline(&mut self) {
        self.doc.buffer.insert_newline();
        self.doc.scroll_to_cursor();
    }

    pub fn backspace(&mut self) {
        self.doc.buffer.backspace();
        self.doc.scroll_to_cursor();
    }

    pub fn delete(&mut self) {
        self.doc.buffer.delete_char_at_cursor();
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        self.doc.set_visible_height(area.height as usize);

        // Line number gutter width (relative line numbers)
        let buffer = &self.doc.buffer;
        let max_line_num = buffer.line_count();
        let gutter_width: u16 = format!("{}", max_line_num).len() as u16 + 2; // " N "
        let text_area = Rect {
            x: area.x + gutter_width,
            width: area.width.saturating_sub(gutter_width),
            ..area
        };
        let gutter_area = Rect {
            width: gutter_width,
            ..area
        };

        let scroll_offset = self.doc.scroll_offset();
        let visible_lines = area.height as usize;

        let mut gutter_lines: Vec<Line> = Vec::new();
        let mut text_lines: Vec<Line> = Vec::new();

        for i in scroll_offset..buffer.line_count().min(scroll_offset + visible_lines) {
            let is_current = i == buffer.cursor_row;

            // Relative line numbers
            let number = if is_current {
                i + 1
            } else {
                i.abs_diff(buffer.cursor_row)
            };
            let gutter_style = if is_current && focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            gutter_lines.push(Line::from(Span::styled(
                format!("{:>width$} ", number, width = gutter_width as usize - 2),
                gutter_style,
            )));

            let text_style = if is_current && focused {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            text_lines.push(Line::from(Span::styled(buffer.lines[i].clone(), text_style)));
        }

        // Fill remaining lines with ~ (like vim)
        for _ in buffer.line_count().saturating_sub(scroll_offset)..visible_lines {
            gutter_lines.push(Line::from(Span::styled(
                format!("{:>width$} ", "~", width = gutter_width as usize - 2),
                Style::default().fg(Color::DarkGray),
            )));
            text_lines.push(Line::from(""));
        }

        frame.render_widget(Paragraph::new(gutter_lines), gutter_area);
        frame.render_widget(Paragraph::new(text_lines), text_area);

        self.overlays
            .render(frame.buffer_mut(), text_area, scroll_offset);

        // Show cursor
        if focused {
            let visible_row = buffer.cursor_row.saturating_sub(scroll_offset);
            let clamp = |v: usize| u16::try_from(v).unwrap_or(u16::MAX);
            let cursor_x = text_area.x.saturating_add(clamp(buffer.cursor_display_col()));
            let cursor_y = text_area.y.saturating_add(clamp(visible_row));
            if cursor_x < text_area.right() && cursor_y < text_area.bottom() {
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space_travel::TravelBox;
    use ratatui::{Terminal, backend::TestBackend};

    fn sample() -> EditorView {
        EditorView::from_text(
            "fn main() {\n    let x = 1;\n    let y = 2;\n\n    println!(\"{}\", x + y);\n}",
        )
    }

    #[test]
    fn test_document_metrics() {
        let view = sample();
        assert_eq!(view.doc.visible_line_range(), (0, 5));
        assert_eq!(view.doc.line_indent(1), 4);
        assert_eq!(view.doc.line_end_column(1), 14);
        assert_eq!(view.doc.line_indent(3), 0);
        assert_eq!(view.doc.line_end_column(4), 26);
    }

    #[test]
    fn test_visible_range_follows_scroll() {
        let text = (0..50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut view = EditorView::from_text(&text);
        view.doc.set_visible_height(10);
        assert_eq!(view.doc.visible_line_range(), (0, 9));

        view.doc.set_collapsed_selection(30, 0);
        assert_eq!(view.doc.visible_line_range(), (21, 30));

        view.doc.set_collapsed_selection(49, 0);
        assert_eq!(view.doc.visible_line_range(), (40, 49));
    }

    #[test]
    fn test_travel_through_view() {
        let mut view = sample();
        view.toggle_space_travel();
        assert!(view.is_travelling());
        assert_eq!(view.navigator().current_box(), TravelBox::new(0, 26, 0, 5));
        assert_eq!(view.overlays().live_count(), 1);

        // {0..=26, 3..=5}
        view.move_cursor(Direction::Down);
        assert_eq!(view.doc.current_position(), (3, 0));
        // {13..=26, 3..=5}: line 3 is empty, so the cursor lands at its end
        view.move_cursor(Direction::Right);
        assert_eq!(view.navigator().current_box(), TravelBox::new(13, 26, 3, 5));
        assert_eq!(view.doc.current_position(), (3, 0));

        view.toggle_space_travel();
        assert!(!view.is_travelling());
        assert_eq!(view.overlays().live_count(), 0);
    }

    #[test]
    fn test_collapsed_selection_snaps_to_line_end() {
        let mut view = EditorView::from_text("abcdef\nab");
        view.doc.set_collapsed_selection(1, 5);
        assert_eq!(view.doc.current_position(), (1, 2));
        view.doc.set_collapsed_selection(0, 5);
        assert_eq!(view.doc.current_position(), (0, 5));
    }

    #[test]
    fn test_move_without_travel_steps_cursor() {
        let mut view = sample();
        view.move_cursor(Direction::Down);
        view.move_cursor(Direction::Right);
        assert_eq!(view.doc.current_position(), (1, 1));
        assert_eq!(view.overlays().live_count(), 0);
    }

    #[test]
    fn test_configure_applies_settings() {
        let mut view = sample();
        view.toggle_space_travel();
        let settings = EditorSettings {
            font_size: 16.0,
            ..EditorSettings::default()
        };
        view.configure(&settings);
        assert_eq!(view.navigator().metrics().char_height, 24.0);
        let spec = view.overlays().specs().next().unwrap();
        assert_eq!(spec.metrics.char_height, 24.0);
        assert_eq!(view.overlays().live_count(), 1);
    }

    #[test]
    fn test_overlay_painted() {
        let mut view = EditorView::from_text("abcd\nabcd\nabcd\nabcd");
        view.toggle_space_travel();

        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area(), true))
            .unwrap();
        let buf = terminal.backend().buffer();

        // Gutter is " N " for a single-digit line count.
        let gutter = 3;
        // Box covers columns 0..=4 on rows 0..=3; guide column is 2.
        assert_eq!(buf[(gutter, 0)].bg, Color::Rgb(40, 44, 64));
        assert_eq!(buf[(gutter + 2, 0)].bg, Color::Rgb(72, 78, 120));
        assert_eq!(buf[(gutter + 4, 3)].bg, Color::Rgb(40, 44, 64));
        assert_ne!(buf[(gutter + 5, 0)].bg, Color::Rgb(40, 44, 64));
        assert_ne!(buf[(gutter, 4)].bg, Color::Rgb(40, 44, 64));
        // Midline sits between rows 1 and 2.
        assert!(buf[(gutter, 1)].modifier.contains(Modifier::UNDERLINED));
        assert!(!buf[(gutter, 2)].modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_cursor_placement_on_long_line() {
        let mut view = EditorView::from_text(&"x".repeat(70_000));
        view.doc.buffer.set_cursor(0, 1);
        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        terminal
            .draw(|frame| view.render(frame, frame.area(), true))
            .unwrap();
        // Gutter is three cells wide.
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            ratatui::layout::Position::new(4, 0)
        );

        // Far past the edge of any terminal: no cursor, no overflow.
        view.doc.buffer.set_cursor(0, 65_534);
        assert!(
            terminal
                .draw(|frame| view.render(frame, frame.area(), true))
                .is_ok()
        );
    }

    #[test]
    fn test_decorations_sink() {
        let mut view = sample();
        view.decorations.set_cursor_shape(CursorShape::Block);
        view.decorations.set_status_text("CURRENT MODE: NORMAL");
        view.decorations.set_mode_flag(EditMode::Normal);
        assert_eq!(view.decorations.cursor_shape, CursorShape::Block);
        assert_eq!(view.decorations.mode_flag, EditMode::Normal);
    }

    #[test]
    fn test_name() {
        assert_eq!(sample().name(), "[scratch]");
        let mut view = sample();
        view.path = Some(PathBuf::from("/tmp/notes.txt"));
        assert_eq!(view.name(), "notes.txt");
    }
}
