use super::cell::CellMetrics;
use super::region::TravelBox;

/// Overlays sit above text.
pub const OVERLAY_Z_INDEX: i32 = 1;

/// Default vertical nudge, in pixels, of the horizontal guide.
pub const DEFAULT_GUIDE_OFFSET: f64 = -1.0;

/// Axis-aligned rectangle in renderer units, relative to an anchor line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A dividing line drawn through the middle of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guide {
    /// Runs the full height of the box at `column`. Positioned relative to
    /// the first visible line, like the bounding rectangle.
    Vertical { column: usize, left: f64, top: f64, height: f64 },
    /// Runs the full width of the box above `line`. Positioned relative to
    /// `anchor_line`, the second line of the box.
    Horizontal {
        line: usize,
        anchor_line: usize,
        left: f64,
        top: f64,
        width: f64,
    },
}

/// Everything a renderer needs to draw the travel overlay for one box.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    /// The box in cell coordinates (lines relative to `first_line`).
    pub region: TravelBox,
    /// Absolute index of the line the viewport starts at.
    pub first_line: usize,
    pub metrics: CellMetrics,
    pub bounds: PixelRect,
    /// Zero, one or two guides.
    pub guides: Vec<Guide>,
    pub z_index: i32,
}

impl OverlaySpec {
    pub fn for_region(
        region: TravelBox,
        first_line: usize,
        metrics: CellMetrics,
        guide_offset: f64,
    ) -> Self {
        let bounds = PixelRect {
            left: metrics.x(region.min_x),
            top: metrics.y(region.min_y),
            width: metrics.width(region.count_x()),
            height: metrics.height(region.count_y()),
        };

        let mut guides = Vec::with_capacity(2);
        if region.count_x() > 1 {
            let column = region.mid_x();
            guides.push(Guide::Vertical {
                column,
                left: metrics.x(column),
                top: bounds.top,
                height: bounds.height,
            });
        }
        if region.count_y() > 1 {
            let line = region.mid_y();
            let anchor_line = region.min_y + 1;
            guides.push(Guide::Horizontal {
                line,
                anchor_line,
                left: bounds.left,
                top: metrics.height(line - anchor_line) + guide_offset,
                width: bounds.width,
            });
        }

        Self {
            region,
            first_line,
            metrics,
            bounds,
            guides,
            z_index: OVERLAY_Z_INDEX,
        }
    }

    pub fn vertical_guide(&self) -> Option<&Guide> {
        self.guides
            .iter()
            .find(|g| matches!(g, Guide::Vertical { .. }))
    }

    pub fn horizontal_guide(&self) -> Option<&Guide> {
        self.guides
            .iter()
            .find(|g| matches!(g, Guide::Horizontal { .. }))
    }
}

/// Draws and removes overlays. Implemented by the host.
pub trait OverlayRenderer {
    type Handle;

    fn create_overlay(&mut self, spec: &OverlaySpec) -> Self::Handle;

    fn clear_overlay(&mut self, handle: Self::Handle);
}

/// Owner of the single live overlay handle.
#[derive(Debug)]
pub struct OverlaySlot<H> {
    handle: Option<H>,
}

impl<H> Default for OverlaySlot<H> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<H> OverlaySlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// Clear the current overlay (if any), then draw `spec`.
    pub fn replace<R>(&mut self, renderer: &mut R, spec: &OverlaySpec)
    where
        R: OverlayRenderer<Handle = H>,
    {
        self.release(renderer);
        self.handle = Some(renderer.create_overlay(spec));
    }

    pub fn release<R>(&mut self, renderer: &mut R)
    where
        R: OverlayRenderer<Handle = H>,
    {
        if let Some(handle) = self.handle.take() {
            renderer.clear_overlay(handle);
        }
    }
}
