use std::path::Path;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Frame, layout::Rect};
use rusqlite::Connection;

use zim_core::{
    editor::EditorView,
    help_popup::{self, HelpPopup},
    keybinds::{Action, KeyState, process_insert_key, process_normal_key},
    mode::{CursorShape, EditMode, ModeManager, ModeSink},
    settings::{self, EditorSettings},
    ui::{self, StatusInfo},
};

/// The main application state.
pub struct App {
    /// Open files, in tab order.
    views: Vec<EditorView>,
    /// Index of the focused view (None = dashboard).
    active_view: Option<usize>,
    modes: ModeManager,
    settings: EditorSettings,
    conn: Connection,
    pub should_quit: bool,
    /// Whether the `:` command line has focus.
    command_active: bool,
    command_input: String,
    command_cursor: usize,
    help_popup: HelpPopup,
    /// Key state for normal mode (persistent so gt/gT work).
    key_state: KeyState,
    /// Result of the last command, shown in the status bar until the next key.
    message: Option<String>,
}

impl App {
    pub fn new(views: Vec<EditorView>, settings: EditorSettings, conn: Connection) -> Self {
        let mut app = Self {
            views,
            active_view: None,
            modes: ModeManager::new(),
            settings,
            conn,
            should_quit: false,
            command_active: false,
            command_input: String::new(),
            command_cursor: 0,
            help_popup: HelpPopup::new(),
            key_state: KeyState::default(),
            message: None,
        };
        for view in &mut app.views {
            view.configure(&app.settings);
        }
        if !app.views.is_empty() {
            app.focus_view(0);
        }
        app
    }

    /// Mode shown for the focused view, or the global mode on the dashboard.
    pub fn mode(&self) -> EditMode {
        self.active()
            .map(|view| view.decorations.mode_flag)
            .unwrap_or_else(|| self.modes.mode())
    }

    /// Terminal cursor shape for the current frame.
    pub fn cursor_shape(&self) -> CursorShape {
        if self.command_active {
            return CursorShape::Line;
        }
        self.active()
            .map(|view| view.decorations.cursor_shape)
            .unwrap_or_else(|| self.modes.mode().cursor_shape())
    }

    fn active(&self) -> Option<&EditorView> {
        self.active_view.map(|idx| &self.views[idx])
    }

    fn active_mut(&mut self) -> Option<&mut EditorView> {
        match self.active_view {
            Some(idx) => self.views.get_mut(idx),
            None => None,
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }

            // Ctrl-c always quits
            if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
                self.should_quit = true;
                return;
            }

            if self.help_popup.visible {
                self.handle_help_key(key);
                return;
            }

            if self.command_active {
                self.handle_command_key(key);
                return;
            }

            self.message = None;
            let inserting = self
                .active()
                .is_some_and(|view| view.decorations.mode_flag == EditMode::Insert);
            let action = if inserting {
                process_insert_key(key)
            } else {
                process_normal_key(key, &mut self.key_state)
            };
            self.process_action(action);
        }
    }

    fn process_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::EnterNormalMode => {
                let sink: Option<&mut dyn ModeSink> = match self.active_view {
                    Some(idx) => Some(&mut self.views[idx].decorations),
                    None => None,
                };
                self.modes.enter_normal_mode(sink);
            }
            Action::EnterInsertMode => {
                let sink: Option<&mut dyn ModeSink> = match self.active_view {
                    Some(idx) => {
                        let view = &mut self.views[idx];
                        view.stop_space_travel();
                        Some(&mut view.decorations)
                    }
                    None => None,
                };
                self.modes.enter_insert_mode(sink);
            }
            Action::EnterCommandMode => {
                self.key_state.reset();
                self.command_active = true;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            Action::Help => self.show_help(),
            Action::NextView => {
                if let Some(current) = self.active_view {
                    self.focus_view((current + 1) % self.views.len());
                }
            }
            Action::PrevView => {
                if let Some(current) = self.active_view {
                    let prev = current.checked_sub(1).unwrap_or(self.views.len() - 1);
                    self.focus_view(prev);
                }
            }
            Action::Move(direction) => {
                if let Some(view) = self.active_mut() {
                    view.move_cursor(direction);
                }
            }
            Action::ToggleSpaceTravel => {
                if let Some(view) = self.active_mut() {
                    view.toggle_space_travel();
                }
            }
            Action::InsertChar(c) => {
                if let Some(view) = self.active_mut() {
                    view.insert_char(c);
                }
            }
            Action::InsertNewline => {
                if let Some(view) = self.active_mut() {
                    view.insert_newline();
                }
            }
            Action::Backspace => {
                if let Some(view) = self.active_mut() {
                    view.backspace();
                }
            }
            Action::Delete => {
                if let Some(view) = self.active_mut() {
                    view.delete();
                }
            }
        }
    }

    /// Focus a view and bring its decorations in line with the current mode.
    fn focus_view(&mut self, idx: usize) {
        if idx >= self.views.len() {
            return;
        }
        self.key_state.reset();
        self.active_view = Some(idx);
        self.modes.apply(&mut self.views[idx].decorations);
        tracing::debug!(view = %self.views[idx].name(), "focused view");
    }

    /// Close a view, focusing its right neighbour (or the dashboard).
    fn close_view(&mut self, idx: usize) {
        let view = self.views.remove(idx);
        tracing::info!(view = %view.name(), "closed view");
        if self.views.is_empty() {
            self.active_view = None;
        } else {
            self.focus_view(idx.min(self.views.len() - 1));
        }
    }

    // ── Command line ─────────────────────────────────────────────────

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.command_active = false;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Enter => {
                let cmd = self.command_input.trim().to_string();
                self.command_active = false;
                self.command_input.clear();
                self.command_cursor = 0;
                if let Err(err) = self.execute_command(&cmd) {
                    tracing::warn!(command = %cmd, "command failed: {err:#}");
                    self.message = Some(format!("{err:#}"));
                }
            }
            KeyCode::Char(c) => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let prev = self.prev_command_boundary();
                    self.command_input.drain(prev..self.command_cursor);
                    self.command_cursor = prev;
                } else if self.command_input.is_empty() {
                    self.command_active = false;
                }
            }
            KeyCode::Left => {
                self.command_cursor = self.prev_command_boundary();
            }
            KeyCode::Right => {
                if self.command_cursor < self.command_input.len() {
                    let next = self.command_input[self.command_cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.command_cursor + i)
                        .unwrap_or(self.command_input.len());
                    self.command_cursor = next;
                }
            }
            _ => {}
        }
    }

    fn prev_command_boundary(&self) -> usize {
        self.command_input[..self.command_cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Execute a command-mode command.
    fn execute_command(&mut self, cmd: &str) -> Result<()> {
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (cmd, None),
        };

        match name {
            "" => {}
            "q" | "quit" => self.quit_view(false)?,
            "q!" | "quit!" => self.quit_view(true)?,
            "qa" | "qa!" => self.should_quit = true,
            "w" | "write" => {
                self.write_active(arg)?;
            }
            "wq" | "x" => {
                self.write_active(arg)?;
                self.quit_view(true)?;
            }
            "e" | "edit" => {
                let path = arg.context("Argument required")?;
                self.open_file(Path::new(path))?;
            }
            "set" => match arg {
                None => self.message = Some(self.settings.summary()),
                Some(assignment) => self.apply_setting(assignment)?,
            },
            _ => anyhow::bail!("Not an editor command: {cmd}"),
        }
        Ok(())
    }

    fn quit_view(&mut self, force: bool) -> Result<()> {
        match self.active_view {
            None => self.should_quit = true,
            Some(idx) => {
                if !force && self.views[idx].is_dirty() {
                    anyhow::bail!("No write since last change (add ! to override)");
                }
                self.close_view(idx);
            }
        }
        Ok(())
    }

    fn write_active(&mut self, path: Option<&str>) -> Result<()> {
        let view = self.active_mut().context("No file open")?;
        let written = view.save(path.map(Path::new))?;
        let lines = view.doc.buffer.line_count();
        self.message = Some(format!("\"{}\" {lines}L written", written.display()));
        Ok(())
    }

    fn open_file(&mut self, path: &Path) -> Result<()> {
        if let Some(idx) = self.views.iter().position(|v| v.path.as_deref() == Some(path)) {
            self.focus_view(idx);
            return Ok(());
        }
        let mut view = EditorView::open(path)?;
        view.configure(&self.settings);
        self.views.push(view);
        self.focus_view(self.views.len() - 1);
        Ok(())
    }

    /// Validate, persist and push a `key=value` setting into every view.
    fn apply_setting(&mut self, assignment: &str) -> Result<()> {
        let mut updated = self.settings;
        updated.apply_assignment(assignment)?;
        settings::save(&self.conn, &updated).context("Failed to save settings")?;
        self.settings = updated;
        for view in &mut self.views {
            view.configure(&self.settings);
        }
        tracing::info!(settings = %self.settings.summary(), "settings changed");
        self.message = Some(self.settings.summary());
        Ok(())
    }

    // ── Help ─────────────────────────────────────────────────────────

    fn show_help(&mut self) {
        self.key_state.reset();
        self.help_popup.show("Help", help_popup::help_entries());
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.help_popup.hide();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.help_popup.scroll_down();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.help_popup.scroll_up();
            }
            _ => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Render the entire application.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let (tab_area, content_area, status_area) = ui::standard_layout(area);

        let names: Vec<String> = self
            .views
            .iter()
            .map(|v| {
                if v.is_dirty() {
                    format!("{} +", v.name())
                } else {
                    v.name()
                }
            })
            .collect();
        if !names.is_empty() {
            ui::render_tab_bar(frame, tab_area, &names, self.active_view.unwrap_or(0));
        }

        let editor_focused = !self.command_active && !self.help_popup.visible;
        match self.active_view {
            Some(idx) => self.views[idx].render(frame, content_area, editor_focused),
            None => render_dashboard(frame, content_area),
        }

        if self.command_active {
            ui::render_command_line(frame, status_area, &self.command_input, self.command_cursor);
        } else {
            let name = self.active().map(EditorView::name);
            let info = StatusInfo {
                view_name: name.as_deref().unwrap_or("Dashboard"),
                travelling: self.active().is_some_and(EditorView::is_travelling),
                message: self.message.as_deref(),
                hint: match self.mode() {
                    EditMode::Normal => "Space: travel  i: insert  ?: help",
                    EditMode::Insert => "Esc: normal",
                },
            };
            ui::render_status_bar(frame, status_area, self.mode(), &info);
        }

        self.help_popup.render(frame, area);
    }
}

/// Render the dashboard when no file is open.
fn render_dashboard(frame: &mut Frame, area: Rect) {
    use ratatui::{
        layout::{Alignment, Constraint, Layout},
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::Paragraph,
    };

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k} "), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {desc}")),
        ])
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "zim",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Modal editing with space travel",
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
        Line::from(""),
        key(":e <path>", "Open a file"),
        key(":set", "Show settings"),
        key("?", "Help"),
        key(":q", "Quit"),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);

    // Center vertically
    let [_, centered, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Fill(1),
    ])
    .areas(area);

    frame.render_widget(paragraph, centered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use zim_core::{db::open_memory_db, space_travel::TravelBox};

    fn app_with(texts: &[&str]) -> App {
        let views = texts.iter().map(|t| EditorView::from_text(t)).collect();
        App::new(views, EditorSettings::default(), open_memory_db().unwrap())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn command(app: &mut App, cmd: &str) {
        press(app, KeyCode::Esc);
        press(app, KeyCode::Char(':'));
        type_str(app, cmd);
        press(app, KeyCode::Enter);
    }

    fn view(app: &App) -> &EditorView {
        app.active().unwrap()
    }

    #[test]
    fn test_starts_in_insert_mode() {
        let mut app = app_with(&["abc"]);
        assert_eq!(app.mode(), EditMode::Insert);
        assert_eq!(app.cursor_shape(), CursorShape::Line);

        type_str(&mut app, "x ");
        assert_eq!(view(&app).doc.buffer.text(), "x abc");
        assert!(view(&app).is_dirty());
    }

    #[test]
    fn test_escape_and_travel() {
        let mut app = app_with(&["abcd\nabcd\nabcd\nabcd"]);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), EditMode::Normal);
        assert_eq!(app.cursor_shape(), CursorShape::Block);
        assert_eq!(view(&app).decorations.status_text, "CURRENT MODE: NORMAL");

        press(&mut app, KeyCode::Char(' '));
        assert!(view(&app).is_travelling());
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(view(&app).navigator().current_box(), TravelBox::new(0, 4, 2, 3));
        assert_eq!(view(&app).doc.buffer.cursor_row, 2);
        // Keys move the cursor, they don't insert text.
        assert!(!view(&app).is_dirty());

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.mode(), EditMode::Insert);
        assert!(!view(&app).is_travelling());
        assert_eq!(view(&app).overlays().live_count(), 0);
    }

    #[test]
    fn test_space_inserts_in_insert_mode() {
        let mut app = app_with(&["ab"]);
        press(&mut app, KeyCode::Char(' '));
        assert!(!view(&app).is_travelling());
        assert_eq!(view(&app).doc.buffer.text(), " ab");
    }

    #[test]
    fn test_dashboard_ignores_mode_changes() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), EditMode::Insert);
        command(&mut app, "q");
        assert!(app.should_quit);
    }

    #[test]
    fn test_view_switching_keeps_mode() {
        let mut app = app_with(&["one", "two"]);
        press(&mut app, KeyCode::Esc);
        type_str(&mut app, "gt");
        assert_eq!(app.active_view, Some(1));
        assert_eq!(view(&app).decorations.mode_flag, EditMode::Normal);
        type_str(&mut app, "gt");
        assert_eq!(app.active_view, Some(0));
        type_str(&mut app, "gT");
        assert_eq!(app.active_view, Some(1));
    }

    #[test]
    fn test_set_persists_and_reconfigures() {
        let mut app = app_with(&["abc"]);
        command(&mut app, "set font_size=16");
        assert_eq!(app.settings.font_size, 16.0);
        assert_eq!(settings::load(&app.conn).unwrap().font_size, 16.0);
        assert_eq!(view(&app).navigator().metrics().char_height, 24.0);
        assert!(app.message.as_deref().unwrap().contains("font_size=16"));
    }

    #[test]
    fn test_bad_set_reports_error() {
        let mut app = app_with(&["abc"]);
        command(&mut app, "set font_size=0");
        assert_eq!(app.settings, EditorSettings::default());
        assert!(app.message.as_deref().unwrap().contains("font_size must be positive"));
        assert_eq!(settings::load(&app.conn).unwrap(), EditorSettings::default());
    }

    #[test]
    fn test_set_without_argument_lists_values() {
        let mut app = app_with(&[]);
        command(&mut app, "set");
        assert_eq!(
            app.message.as_deref(),
            Some("font_size=14  line_height=0  char_width=1  guide_offset=-1")
        );
    }

    #[test]
    fn test_write_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut app = app_with(&["hello"]);
        type_str(&mut app, "> ");

        command(&mut app, &format!("w {}", path.display()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "> hello\n");
        assert!(!view(&app).is_dirty());
        assert_eq!(view(&app).name(), "notes.txt");

        command(&mut app, "q");
        assert_eq!(app.active_view, None);

        command(&mut app, &format!("e {}", path.display()));
        assert_eq!(view(&app).doc.buffer.text(), "> hello");
    }

    #[test]
    fn test_write_without_name_fails() {
        let mut app = app_with(&["hello"]);
        command(&mut app, "w");
        assert_eq!(app.message.as_deref(), Some("No file name"));
    }

    #[test]
    fn test_quit_refuses_dirty_view() {
        let mut app = app_with(&["a", "b"]);
        type_str(&mut app, "x");
        command(&mut app, "q");
        assert_eq!(app.views.len(), 2);
        assert!(app.message.is_some());

        command(&mut app, "q!");
        assert_eq!(app.views.len(), 1);
        assert_eq!(view(&app).doc.buffer.text(), "b");
        assert!(!app.should_quit);

        command(&mut app, "qa");
        assert!(app.should_quit);
    }

    #[test]
    fn test_unknown_command() {
        let mut app = app_with(&["a"]);
        command(&mut app, "frobnicate");
        assert_eq!(
            app.message.as_deref(),
            Some("Not an editor command: frobnicate")
        );
    }

    #[test]
    fn test_help_popup_swallows_keys() {
        let mut app = app_with(&["a"]);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.help_popup.visible);
        press(&mut app, KeyCode::Char(' '));
        assert!(!view(&app).is_travelling());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.help_popup.visible);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_renders() {
        let mut app = app_with(&["fn main() {}"]);
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let buf = terminal.backend().buffer();
        let status: String = (0..40).map(|x| buf[(x, 7)].symbol().to_string()).collect();
        assert!(status.starts_with(" INSERT  [scratch]"));
    }
}
