//! Scale-to-fit layout of a template inside a viewport.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Fraction of the container the content may occupy.
pub const FIT_RATIO: f32 = 0.95;

/// Minimum on-screen size, in pixels, of the shorter template side.
pub const MIN_VISIBLE_SIZE: f32 = 400.0;

/// Result of fitting template content into a container.
///
/// A zeroed layout means "not renderable yet" (container or template size
/// unknown), not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLayout {
    /// Displayed content width in screen pixels.
    pub display_width: f32,
    /// Displayed content height in screen pixels.
    pub display_height: f32,
    /// Template pixels to screen pixels.
    pub content_scale: f32,
    /// Left offset of the content inside the container.
    pub offset_x: f32,
    /// Top offset of the content inside the container.
    pub offset_y: f32,
}

impl ContentLayout {
    /// Whether the layout can be drawn.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.content_scale > 0.0 && self.display_width > 0.0 && self.display_height > 0.0
    }

    /// The content box in container coordinates.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.display_width,
            self.display_height,
        )
    }

    /// Convert a container point to template coordinates.
    ///
    /// Returns `None` for a layout that is not renderable.
    #[must_use]
    pub fn screen_to_template(&self, point: Point) -> Option<Point> {
        self.is_renderable().then(|| {
            Point::new(
                (point.x - self.offset_x) / self.content_scale,
                (point.y - self.offset_y) / self.content_scale,
            )
        })
    }

    /// Convert a template point to container coordinates.
    #[must_use]
    pub fn template_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.content_scale + self.offset_x,
            point.y * self.content_scale + self.offset_y,
        )
    }

    /// Convert a template rectangle to container coordinates.
    #[must_use]
    pub fn template_rect_to_screen(&self, rect: Rect) -> Rect {
        let origin = self.template_to_screen(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            rect.width * self.content_scale,
            rect.height * self.content_scale,
        )
    }
}

/// Fit a `source_width` x `source_height` template into a container.
///
/// `ui_scale` is the user's zoom multiplier. The content never exceeds
/// [`FIT_RATIO`] of the container unless that would make the shorter template
/// side smaller than [`MIN_VISIBLE_SIZE`], in which case the floor wins.
#[must_use]
pub fn compute_layout(
    container_width: f32,
    container_height: f32,
    source_width: f32,
    source_height: f32,
    ui_scale: f32,
) -> ContentLayout {
    let dims = [container_width, container_height, source_width, source_height];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return ContentLayout::default();
    }

    let avail_width = container_width * FIT_RATIO;
    let avail_height = container_height * FIT_RATIO;

    let base_scale = if source_width / source_height > avail_width / avail_height {
        avail_width / source_width
    } else {
        avail_height / source_height
    };

    let ui_scale = if ui_scale.is_finite() { ui_scale.max(0.0) } else { 1.0 };
    let mut final_scale = base_scale * ui_scale;

    if source_width * final_scale > avail_width || source_height * final_scale > avail_height {
        final_scale = (avail_width / source_width).min(avail_height / source_height);
    }

    let shorter_side = source_width.min(source_height);
    if shorter_side * final_scale < MIN_VISIBLE_SIZE {
        final_scale = MIN_VISIBLE_SIZE / shorter_side;
    }

    let display_width = source_width * final_scale;
    let display_height = source_height * final_scale;

    ContentLayout {
        display_width,
        display_height,
        content_scale: final_scale,
        offset_x: ((container_width - display_width) / 2.0).max(0.0),
        offset_y: ((container_height - display_height) / 2.0).max(0.0),
    }
}
