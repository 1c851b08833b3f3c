use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};

use crate::mode::EditMode;

/// Render the top tab bar showing open files.
pub fn render_tab_bar(frame: &mut Frame, area: Rect, names: &[String], active: usize) {
    let titles: Vec<Line> = names.iter().map(|n| Line::from(n.as_str())).collect();

    let tabs = Tabs::new(titles)
        .select(active)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .style(Style::default().add_modifier(Modifier::DIM))
        .divider(Span::raw(" | "));

    frame.render_widget(tabs, area);
}

/// What the status bar shows besides the mode.
#[derive(Debug, Default)]
pub struct StatusInfo<'a> {
    pub view_name: &'a str,
    pub travelling: bool,
    /// Last command result or error; replaces `hint` when set.
    pub message: Option<&'a str>,
    pub hint: &'a str,
}

/// Render the bottom status bar.
pub fn render_status_bar(frame: &mut Frame, area: Rect, mode: EditMode, info: &StatusInfo) {
    let mode_style = match mode {
        EditMode::Normal => Style::default()
            .fg(Color::Black)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        EditMode::Insert => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", mode.label()), mode_style),
        Span::raw(" "),
        Span::styled(info.view_name, Style::default().add_modifier(Modifier::BOLD)),
    ];
    if info.travelling {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            " TRAVEL ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw("  "));
    match info.message {
        Some(message) => spans.push(Span::raw(message)),
        None => spans.push(Span::styled(
            info.hint,
            Style::default().add_modifier(Modifier::DIM),
        )),
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(bar, area);
}

/// Render the command-line input at the bottom of the screen.
pub fn render_command_line(frame: &mut Frame, area: Rect, input: &str, cursor: usize) {
    let line = Line::from(vec![
        Span::styled(":", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(input),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = crate::editor::buffer::display_width(&input[..cursor]) as u16;
    frame.set_cursor_position((area.x + 1 + cursor_x, area.y));
}

/// Standard layout: tab bar (1 line) + main content + status bar (1 line).
/// Returns (tab_area, content_area, status_area).
pub fn standard_layout(area: Rect) -> (Rect, Rect, Rect) {
    let [tab_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    (tab_area, content_area, status_area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn status_text(mode: EditMode, info: &StatusInfo) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal
            .draw(|frame| render_status_bar(frame, frame.area(), mode, info))
            .unwrap();
        let buf = terminal.backend().buffer();
        (0..60).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_status_bar_shows_mode_and_travel() {
        let info = StatusInfo {
            view_name: "main.rs",
            travelling: true,
            message: None,
            hint: "?:help",
        };
        let text = status_text(EditMode::Normal, &info);
        assert!(text.starts_with(" NORMAL  main.rs  TRAVEL"));
        assert!(text.contains("?:help"));
    }

    #[test]
    fn test_status_bar_message_replaces_hint() {
        let info = StatusInfo {
            view_name: "[scratch]",
            travelling: false,
            message: Some("No file name"),
            hint: "?:help",
        };
        let text = status_text(EditMode::Insert, &info);
        assert!(text.starts_with(" INSERT  [scratch]"));
        assert!(text.contains("No file name"));
        assert!(!text.contains("?:help"));
        assert!(!text.contains("TRAVEL"));
    }
}
