//! Drag-to-move state machine.
//!
//! `Idle -> Dragging -> Idle`. Pointer positions are in screen space; element
//! positions are in template space.

use crate::element::{Element, ElementId};
use crate::geometry::Point;

/// An active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Element being dragged.
    pub element: ElementId,
    /// Pointer position at pointer-down (screen space).
    pub pointer_start: Point,
    /// Element position at pointer-down (template space).
    pub element_start: Point,
    /// Last position handed out by [`DragState::update`].
    last_emitted: Point,
}

impl DragSession {
    /// Whether the element has moved since the drag began.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.last_emitted != self.element_start
    }
}

/// Drag state of the interactive canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Pointer is down on a draggable element.
    Dragging(DragSession),
}

/// Bounds used to clamp a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBounds {
    /// Template width.
    pub canvas_width: f32,
    /// Template height.
    pub canvas_height: f32,
    /// Dragged element width.
    pub element_width: f32,
    /// Dragged element height.
    pub element_height: f32,
}

impl DragBounds {
    /// Clamp a position so the element stays on the canvas.
    ///
    /// Each axis is clamped to `[0, canvas - element]`; an element larger than
    /// the canvas pins to 0.
    #[must_use]
    pub fn clamp(&self, position: Point) -> Point {
        let max_x = (self.canvas_width - self.element_width).max(0.0);
        let max_y = (self.canvas_height - self.element_height).max(0.0);
        Point::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
    }
}

impl DragState {
    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    /// The element being dragged, if any.
    #[must_use]
    pub fn active_element(&self) -> Option<&ElementId> {
        match self {
            Self::Dragging(session) => Some(&session.element),
            Self::Idle => None,
        }
    }

    /// Start dragging `element` from `pointer`.
    ///
    /// Returns `false` and stays idle if the element is not draggable.
    pub fn begin(&mut self, element: &Element, pointer: Point) -> bool {
        if !element.is_draggable() {
            return false;
        }
        let start = Point::new(element.transform.x, element.transform.y);
        *self = Self::Dragging(DragSession {
            element: element.id.clone(),
            pointer_start: pointer,
            element_start: start,
            last_emitted: start,
        });
        true
    }

    /// Move the pointer.
    ///
    /// Returns the new clamped element position only when it differs from
    /// the last one returned.
    pub fn update(
        &mut self,
        pointer: Point,
        content_scale: f32,
        bounds: DragBounds,
    ) -> Option<Point> {
        let Self::Dragging(session) = self else {
            return None;
        };
        if !(content_scale.is_finite() && content_scale > 0.0) {
            return None;
        }

        let dx = (pointer.x - session.pointer_start.x) / content_scale;
        let dy = (pointer.y - session.pointer_start.y) / content_scale;
        let next = bounds.clamp(Point::new(
            session.element_start.x + dx,
            session.element_start.y + dy,
        ));

        if next == session.last_emitted {
            return None;
        }
        session.last_emitted = next;
        Some(next)
    }

    /// Release the pointer, returning the finished session.
    pub fn end(&mut self) -> Option<DragSession> {
        match std::mem::take(self) {
            Self::Dragging(session) => Some(session),
            Self::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, MediaSource, ObjectFit, TextStyle, Transform};
    use proptest::prelude::*;

    fn text_at(x: f32, y: f32) -> Element {
        Element::new(ElementKind::Text(TextStyle::new("drag me")))
            .with_id("text")
            .with_transform(Transform::from_xywh(x, y, 720.0, 100.0))
    }

    const BOUNDS: DragBounds = DragBounds {
        canvas_width: 800.0,
        canvas_height: 800.0,
        element_width: 720.0,
        element_height: 100.0,
    };

    #[test]
    fn test_clamps_to_maximum() {
        let mut drag = DragState::default();
        assert!(drag.begin(&text_at(40.0, 480.0), Point::new(100.0, 100.0)));
        let moved = drag
            .update(Point::new(1100.0, 1100.0), 0.5, BOUNDS)
            .expect("position changed");
        assert!((moved.x - 80.0).abs() < f32::EPSILON);
        assert!((moved.y - 700.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_only_emits_changes() {
        let mut drag = DragState::default();
        drag.begin(&text_at(40.0, 480.0), Point::new(0.0, 0.0));
        assert!(drag.update(Point::new(500.0, 0.0), 1.0, BOUNDS).is_some());
        // Already pinned at max x; further right moves are no-ops.
        assert!(drag.update(Point::new(900.0, 0.0), 1.0, BOUNDS).is_none());
        assert!(drag.update(Point::new(0.0, 0.0), 0.0, BOUNDS).is_none());
    }

    #[test]
    fn test_non_text_elements_do_not_drag() {
        let mut drag = DragState::default();
        let image = Element::new(ElementKind::Image(MediaSource::new("", ObjectFit::Cover)));
        assert!(!drag.begin(&image, Point::default()));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_end_returns_session() {
        let mut drag = DragState::default();
        drag.begin(&text_at(40.0, 480.0), Point::default());
        drag.update(Point::new(10.0, 0.0), 1.0, BOUNDS);
        let session = drag.end().expect("was dragging");
        assert!(session.has_moved());
        assert!(!drag.is_dragging());
        assert!(drag.end().is_none());
    }

    proptest! {
        #[test]
        fn prop_position_stays_on_canvas(
            x in 0.0f32..80.0,
            y in 0.0f32..700.0,
            dx in -5000.0f32..5000.0,
            dy in -5000.0f32..5000.0,
            scale in 0.05f32..4.0,
        ) {
            let mut drag = DragState::default();
            drag.begin(&text_at(x, y), Point::default());
            if let Some(p) = drag.update(Point::new(dx, dy), scale, BOUNDS) {
                prop_assert!(p.x >= 0.0 && p.x <= 80.0);
                prop_assert!(p.y >= 0.0 && p.y <= 700.0);
            }
        }
    }
}
