use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// A single key and what it does, grouped under a section header.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub section: &'static str,
    pub key: &'static str,
    pub description: &'static str,
}

impl HelpEntry {
    pub const fn new(section: &'static str, key: &'static str, description: &'static str) -> Self {
        Self {
            section,
            key,
            description,
        }
    }
}

/// The help popup state.
#[derive(Debug, Default)]
pub struct HelpPopup {
    pub visible: bool,
    title: String,
    entries: Vec<HelpEntry>,
    /// Scroll offset for long help content.
    scroll: u16,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, entries: Vec<HelpEntry>) {
        self.visible = true;
        self.title = title.into();
        self.entries = entries;
        self.scroll = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.entries.clear();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Render the help popup centered on screen.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible || self.entries.is_empty() {
            return;
        }

        let lines = self.build_lines();

        let popup_width = (area.width.saturating_sub(8)).min(60);
        let popup_height = (area.height.saturating_sub(6)).min(lines.len() as u16 + 2);
        let popup_area = centered_rect(popup_width, popup_height, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL);

        let max_scroll = (lines.len() as u16).saturating_sub(popup_height.saturating_sub(2));
        let scroll = self.scroll.min(max_scroll);

        let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, popup_area);
    }

    /// Build display lines from entries, inserting section headers.
    fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut current_section = None;

        for entry in &self.entries {
            if current_section != Some(entry.section) {
                if !lines.is_empty() {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!(" {}", entry.section),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )));
                current_section = Some(entry.section);
            }

            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>12} ", entry.key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(entry.description),
            ]));
        }

        // Footer
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Esc/q/?  close    j/k  scroll",
            Style::default().add_modifier(Modifier::DIM),
        )));

        lines
    }
}

/// Every key zim understands.
pub fn help_entries() -> Vec<HelpEntry> {
    vec![
        HelpEntry::new("Navigation", "h j k l", "Move left / down / up / right"),
        HelpEntry::new("Navigation", "arrows", "Move (any mode)"),
        HelpEntry::new("Navigation", "gt / gT", "Next / previous file"),
        HelpEntry::new("Space travel", "<Space>", "Start / stop space travel"),
        HelpEntry::new("Space travel", "h j k l", "Keep the left / lower / upper / right half"),
        HelpEntry::new("Modes", "i", "Insert mode (stops travel)"),
        HelpEntry::new("Modes", "Esc", "Normal mode"),
        HelpEntry::new("Commands", ":w [path]", "Write file"),
        HelpEntry::new("Commands", ":wq", "Write and close"),
        HelpEntry::new("Commands", ":e path", "Open file"),
        HelpEntry::new("Commands", ":q", "Close file / quit"),
        HelpEntry::new("Commands", ":qa", "Quit all"),
        HelpEntry::new("Commands", ":set k=v", "Change a setting (:set lists them)"),
        HelpEntry::new("Other", "?", "This help"),
        HelpEntry::new("Other", "Ctrl-c", "Force quit"),
    ]
}

/// Helper to create a centered rect within a given area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_grouped() {
        let mut popup = HelpPopup::new();
        popup.show("Help", help_entries());
        let lines = popup.build_lines();
        let headers: Vec<String> = lines
            .iter()
            .filter(|l| l.spans.len() == 1 && l.spans[0].style.add_modifier.contains(Modifier::UNDERLINED))
            .map(|l| l.spans[0].content.trim().to_string())
            .collect();
        assert_eq!(headers, vec!["Navigation", "Space travel", "Modes", "Commands", "Other"]);
    }

    #[test]
    fn test_hide_resets() {
        let mut popup = HelpPopup::new();
        popup.show("Help", help_entries());
        popup.scroll_down();
        popup.hide();
        assert!(!popup.visible);
        assert_eq!(popup.scroll, 0);
    }
}
