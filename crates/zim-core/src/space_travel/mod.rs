//! Space travel: cursor navigation by repeated halving of the visible text.
//!
//! Starting travel measures the visible lines and boxes them in. Each
//! directional key then keeps the half of the box lying in that direction,
//! clamps the cursor into what remains and redraws the overlay. The host
//! editor is reached only through the traits in [`ports`] and
//! [`overlay::OverlayRenderer`].

pub mod cell;
pub mod overlay;
pub mod ports;
pub mod region;

use cell::{CellMetrics, line_height_px};
use overlay::{DEFAULT_GUIDE_OFFSET, OverlayRenderer, OverlaySlot, OverlaySpec};
use ports::{CursorSink, ViewportMetrics};
pub use region::{Direction, TravelBox};

/// Per-view travel state.
#[derive(Debug)]
pub struct NavigationState<H> {
    pub active: bool,
    pub metrics: CellMetrics,
    pub current_box: TravelBox,
    /// The box before the last successful bisection.
    pub previous_box: TravelBox,
    /// First visible line when travel started. Box lines are offsets from it.
    pub first_line: usize,
    overlay: OverlaySlot<H>,
}

impl<H> Default for NavigationState<H> {
    fn default() -> Self {
        Self {
            active: false,
            metrics: CellMetrics::default(),
            current_box: TravelBox::default(),
            previous_box: TravelBox::default(),
            first_line: 0,
            overlay: OverlaySlot::new(),
        }
    }
}

/// The space-travel engine for one editor view.
///
/// `H` is the overlay handle type of the renderer the view draws with.
#[derive(Debug)]
pub struct SpaceNavigator<H> {
    state: NavigationState<H>,
    guide_offset: f64,
}

impl<H> Default for SpaceNavigator<H> {
    fn default() -> Self {
        Self {
            state: NavigationState::default(),
            guide_offset: DEFAULT_GUIDE_OFFSET,
        }
    }
}

impl<H> SpaceNavigator<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState<H> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn current_box(&self) -> TravelBox {
        self.state.current_box
    }

    pub fn previous_box(&self) -> TravelBox {
        self.state.previous_box
    }

    pub fn metrics(&self) -> CellMetrics {
        self.state.metrics
    }

    pub fn has_live_overlay(&self) -> bool {
        self.state.overlay.is_live()
    }

    /// Derive the cell height from the editor's line-height and font-size
    /// settings. Safe to call at any time.
    pub fn configure(&mut self, line_height: f64, font_size: f64) {
        self.state.metrics.char_height = line_height_px(line_height, font_size);
        tracing::debug!(
            line_height,
            font_size,
            char_height = self.state.metrics.char_height,
            "configured space travel"
        );
    }

    pub fn set_char_width(&mut self, char_width: f64) {
        self.state.metrics.char_width = char_width;
    }

    /// Vertical nudge applied to the horizontal guide, in renderer units.
    pub fn set_guide_offset(&mut self, offset: f64) {
        self.guide_offset = offset;
    }

    /// Apply new settings and redraw the overlay if travel is under way.
    pub fn reconfigure<R>(
        &mut self,
        line_height: f64,
        font_size: f64,
        char_width: f64,
        guide_offset: f64,
        renderer: &mut R,
    ) where
        R: OverlayRenderer<Handle = H>,
    {
        self.configure(line_height, font_size);
        self.set_char_width(char_width);
        self.set_guide_offset(guide_offset);
        if self.state.active {
            self.render(renderer);
        }
    }

    /// Box in the visible lines and start travelling. Does nothing if travel
    /// is already active.
    pub fn start_travel<V, R>(&mut self, viewport: &V, renderer: &mut R)
    where
        V: ViewportMetrics + ?Sized,
        R: OverlayRenderer<Handle = H>,
    {
        if self.state.active {
            tracing::trace!("space travel already active");
            return;
        }

        let (first, last) = viewport.visible_line_range();
        let (min_x, max_x) = (first..=last).fold((usize::MAX, 0), |(min_x, max_x), line| {
            (
                min_x.min(viewport.line_indent(line)),
                max_x.max(viewport.line_end_column(line)),
            )
        });

        self.state.current_box = TravelBox::new(min_x, max_x, 0, last - first);
        self.state.first_line = first;
        self.state.active = true;
        tracing::debug!(first, last, region = %self.state.current_box, "space travel started");
        self.render(renderer);
    }

    /// Leave travel and remove the overlay. The boxes are kept as they were.
    pub fn stop_travel<R>(&mut self, renderer: &mut R)
    where
        R: OverlayRenderer<Handle = H>,
    {
        if !self.state.active {
            return;
        }
        self.state.overlay.release(renderer);
        self.state.active = false;
        tracing::debug!(region = %self.state.current_box, "space travel stopped");
    }

    pub fn toggle_travel<V, R>(&mut self, viewport: &V, renderer: &mut R)
    where
        V: ViewportMetrics + ?Sized,
        R: OverlayRenderer<Handle = H>,
    {
        if self.state.active {
            self.stop_travel(renderer);
        } else {
            self.start_travel(viewport, renderer);
        }
    }

    /// Keep the half of the current box lying in `direction` and pull the
    /// cursor into it. Returns `false` when travel is off or the box can't be
    /// split that way, in which case nothing changes.
    pub fn bisect<C, R>(&mut self, direction: Direction, cursor: &mut C, renderer: &mut R) -> bool
    where
        C: CursorSink + ?Sized,
        R: OverlayRenderer<Handle = H>,
    {
        if !self.state.active {
            tracing::trace!(direction = direction.label(), "bisect while inactive ignored");
            return false;
        }
        let current = self.state.current_box;
        let Some(next) = current.bisect(direction) else {
            tracing::trace!(direction = direction.label(), region = %current, "bisect ignored");
            return false;
        };

        self.state.previous_box = current;
        self.state.current_box = next;

        let first = self.state.first_line;
        let (line, column) = cursor.current_position();
        cursor.set_collapsed_selection(next.clamp_line(line, first), next.clamp_column(column));

        tracing::debug!(direction = direction.label(), region = %next, "bisected");
        self.render(renderer);
        true
    }

    /// Move the cursor one cell, as if travel were off.
    pub fn plain_move<C>(&mut self, direction: Direction, units: usize, cursor: &mut C)
    where
        C: CursorSink + ?Sized,
    {
        cursor.translate_cursor(direction, units);
    }

    /// The move command: bisect while travelling, otherwise step the cursor.
    pub fn handle_move<C, R>(&mut self, direction: Direction, cursor: &mut C, renderer: &mut R)
    where
        C: CursorSink + ?Sized,
        R: OverlayRenderer<Handle = H>,
    {
        if self.state.active {
            self.bisect(direction, cursor, renderer);
        } else {
            self.plain_move(direction, 1, cursor);
        }
    }

    fn render<R>(&mut self, renderer: &mut R)
    where
        R: OverlayRenderer<Handle = H>,
    {
        let spec = OverlaySpec::for_region(
            self.state.current_box,
            self.state.first_line,
            self.state.metrics,
            self.guide_offset,
        );
        self.state.overlay.replace(renderer, &spec);
    }
}
