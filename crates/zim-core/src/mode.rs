/// Edit modes, modeled after vim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Navigation and commands via keybinds.
    Normal,
    /// Keys insert text. The mode zim starts in.
    #[default]
    Insert,
}

impl EditMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
        }
    }

    pub fn cursor_shape(&self) -> CursorShape {
        match self {
            Self::Normal => CursorShape::Block,
            Self::Insert => CursorShape::Line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    Block,
    #[default]
    Line,
}

/// Decorations a view shows for the current mode. Implemented by the host.
pub trait ModeSink {
    fn set_cursor_shape(&mut self, shape: CursorShape);

    fn set_status_text(&mut self, text: &str);

    /// Publish the mode so other commands can gate on it.
    fn set_mode_flag(&mut self, mode: EditMode);
}

/// Tracks the edit mode and keeps the active view's decorations in sync.
#[derive(Debug, Default)]
pub struct ModeManager {
    mode: EditMode,
}

impl ModeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Switch to normal mode. Returns whether anything changed: there must be
    /// an active `view` and the mode must not already be normal.
    pub fn enter_normal_mode(&mut self, view: Option<&mut dyn ModeSink>) -> bool {
        self.transition(EditMode::Normal, view)
    }

    /// Switch to insert mode, with the same rules as
    /// [`enter_normal_mode`](Self::enter_normal_mode).
    pub fn enter_insert_mode(&mut self, view: Option<&mut dyn ModeSink>) -> bool {
        self.transition(EditMode::Insert, view)
    }

    /// Push the current mode's decorations to `view` without changing mode.
    pub fn apply(&self, view: &mut dyn ModeSink) {
        decorate(view, self.mode);
    }

    fn transition(&mut self, target: EditMode, view: Option<&mut dyn ModeSink>) -> bool {
        let Some(view) = view else {
            tracing::trace!(requested = target.label(), "no active view, ignoring mode change");
            return false;
        };
        if self.mode == target {
            return false;
        }
        decorate(view, target);
        tracing::debug!(from = self.mode.label(), to = target.label(), "mode changed");
        self.mode = target;
        true
    }
}

fn decorate(view: &mut dyn ModeSink, mode: EditMode) {
    view.set_cursor_shape(mode.cursor_shape());
    view.set_status_text(&format!("CURRENT MODE: {}", mode.label()));
    view.set_mode_flag(mode);
}
