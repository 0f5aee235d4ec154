//! Interactive canvas view model.
//!
//! Turns the editor state into positioned overlay nodes at the current
//! content scale and handles selection, hit testing and drag-to-move.
//! Missing data never fails; it degrades to informational content.

use serde::Serialize;

use crate::drag::{DragBounds, DragState};
use crate::element::{
    Element, ElementId, ElementKind, FontStyle, FontWeight, ObjectFit, PlaybackFlags, TextAlign,
};
use crate::geometry::{Point, Rect};
use crate::layout::ContentLayout;
use crate::store::EditorStore;
use crate::{CoreResult, PropertyUpdate};

/// Shown when no template is selected.
pub const NO_TEMPLATE_MESSAGE: &str = "Select a template to start editing";

/// Shown when the template has no elements.
pub const EMPTY_TEMPLATE_MESSAGE: &str = "This template has no elements yet";

/// Stacking order given to the element being dragged.
pub const DRAG_ELEVATION: i32 = 1000;

/// Selection outline color.
pub const SELECTION_COLOR: &str = "#3b82f6";

/// What the canvas should display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ViewContent {
    /// No template loaded.
    Placeholder {
        /// Informational message.
        message: &'static str,
    },
    /// Layout not computed yet (zero-sized container or template).
    Pending,
    /// Template loaded but has no elements.
    Empty {
        /// Content box on screen.
        content: Rect,
        /// CSS background color.
        background: String,
        /// Informational message.
        message: &'static str,
    },
    /// Elements to display, back to front.
    Nodes {
        /// Content box on screen.
        content: Rect,
        /// CSS background color.
        background: String,
        /// Overlay nodes in compositing order.
        nodes: Vec<OverlayNode>,
    },
}

/// Outline drawn around a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outline {
    /// Stroke width in screen pixels.
    pub width: f32,
    /// CSS color.
    pub color: &'static str,
    /// Dashed stroke.
    pub dashed: bool,
}

/// Whitespace handling of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// Preserve spaces and newlines, wrap at the box edge.
    PreWrap,
}

/// Text body of a node, already scaled to screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    /// Text after the case transform.
    pub text: String,
    /// CSS font stack.
    pub font_family: String,
    /// Font size in screen pixels.
    pub font_size: f32,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Font slant.
    pub font_style: FontStyle,
    /// CSS color.
    pub color: String,
    /// Horizontal alignment within the block.
    pub align: TextAlign,
    /// Line height multiplier.
    pub line_height: f32,
    /// Letter spacing in screen pixels.
    pub letter_spacing: f32,
    /// Whitespace policy.
    pub white_space: WhiteSpace,
}

/// Media body of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaBox {
    /// Asset URL; empty when no asset has been picked.
    pub src: String,
    /// Fit policy, cropped to the node box.
    pub object_fit: ObjectFit,
    /// Playback flags for video, `None` for still images.
    pub playback: Option<PlaybackFlags>,
}

/// Node body by element type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeBody {
    /// Flex-centered text (text and watermark elements).
    Text(TextBlock),
    /// Cropped media box (image and video elements).
    Media(MediaBox),
}

/// One absolutely positioned overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayNode {
    /// Element id.
    pub id: ElementId,
    /// Box in container coordinates.
    pub rect: Rect,
    /// Rotation in degrees about the box center.
    pub rotation: f32,
    /// Opacity 0-1.
    pub opacity: f32,
    /// Stacking order.
    pub stack_order: i32,
    /// Receives pointer events.
    pub interactive: bool,
    /// Element is selected.
    pub selected: bool,
    /// Element is being dragged.
    pub dragging: bool,
    /// Selection outline.
    pub outline: Option<Outline>,
    /// Translucent highlight color while dragging.
    pub highlight: Option<&'static str>,
    /// Content.
    pub body: NodeBody,
}

/// Interactive canvas state: the current layout plus drag bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct CanvasView {
    layout: ContentLayout,
    drag: DragState,
    swallow_click: bool,
}

impl CanvasView {
    /// Create a view with the given layout.
    #[must_use]
    pub fn new(layout: ContentLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Current layout.
    #[must_use]
    pub fn layout(&self) -> ContentLayout {
        self.layout
    }

    /// Replace the layout, e.g. after a debounced resize.
    pub fn set_layout(&mut self, layout: ContentLayout) {
        self.layout = layout;
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Describe what the canvas should show.
    #[must_use]
    pub fn render(&self, store: &EditorStore) -> ViewContent {
        let Some(template) = store.template() else {
            return ViewContent::Placeholder {
                message: NO_TEMPLATE_MESSAGE,
            };
        };
        if !self.layout.is_renderable() {
            return ViewContent::Pending;
        }

        let content = self.layout.content_rect();
        let background = template.background_color.clone();
        if template.is_empty() {
            return ViewContent::Empty {
                content,
                background,
                message: EMPTY_TEMPLATE_MESSAGE,
            };
        }

        let selected = store.selected_id();
        let dragging = self.drag.active_element();
        let nodes = template
            .draw_order()
            .into_iter()
            .map(|element| {
                let catalog_index = template.position_of(&element.id).unwrap_or_default();
                self.node_for(
                    element,
                    catalog_index,
                    selected == Some(&element.id),
                    dragging == Some(&element.id),
                )
            })
            .collect();

        ViewContent::Nodes {
            content,
            background,
            nodes,
        }
    }

    fn node_for(
        &self,
        element: &Element,
        catalog_index: usize,
        selected: bool,
        dragging: bool,
    ) -> OverlayNode {
        let scale = self.layout.content_scale;
        let body = match &element.kind {
            ElementKind::Text(style) | ElementKind::Watermark(style) => NodeBody::Text(TextBlock {
                text: style.display_text(),
                font_family: style.font_family.clone(),
                font_size: style.font_size * scale,
                font_weight: style.font_weight,
                font_style: style.font_style,
                color: style.color.clone(),
                align: style.text_align,
                line_height: style.line_height,
                letter_spacing: style.letter_spacing * scale,
                white_space: WhiteSpace::PreWrap,
            }),
            ElementKind::Image(media) => NodeBody::Media(MediaBox {
                src: media.src.clone(),
                object_fit: media.object_fit,
                playback: None,
            }),
            ElementKind::Video(video) => NodeBody::Media(MediaBox {
                src: video.media.src.clone(),
                object_fit: video.media.object_fit,
                playback: Some(video.playback),
            }),
        };

        OverlayNode {
            id: element.id.clone(),
            rect: self.layout.template_rect_to_screen(element.transform.rect()),
            rotation: element.transform.rotation,
            opacity: element.transform.opacity,
            stack_order: if dragging {
                DRAG_ELEVATION
            } else {
                element
                    .transform
                    .z_index
                    .unwrap_or_else(|| i32::try_from(catalog_index).unwrap_or(i32::MAX))
            },
            interactive: element.is_interactive(),
            selected,
            dragging,
            outline: selected.then_some(Outline {
                width: 2.0,
                color: SELECTION_COLOR,
                dashed: true,
            }),
            highlight: dragging.then_some("rgba(59, 130, 246, 0.12)"),
            body,
        }
    }

    /// The topmost interactive element under a container point.
    #[must_use]
    pub fn element_at(&self, store: &EditorStore, point: Point) -> Option<ElementId> {
        let template = store.template()?;
        let local = self.layout.screen_to_template(point)?;
        template
            .draw_order()
            .into_iter()
            .rev()
            .find(|e| e.is_interactive() && e.contains_point(local))
            .map(|e| e.id.clone())
    }

    /// Handle a click: select the element under the pointer, or clear the
    /// selection on empty canvas. Ignored while dragging and for the click
    /// that ends a drag.
    pub fn click(&mut self, store: &mut EditorStore, point: Point) {
        if self.drag.is_dragging() {
            return;
        }
        if std::mem::take(&mut self.swallow_click) {
            return;
        }
        match self.element_at(store, point) {
            Some(id) => {
                if let Err(e) = store.select(&id) {
                    tracing::debug!("Click selection failed: {e}");
                }
            }
            None => store.clear_selection(),
        }
    }

    /// Pointer pressed. Starts a drag when a text element is under the
    /// pointer and selects it. Returns whether a drag started.
    pub fn pointer_down(&mut self, store: &mut EditorStore, point: Point) -> bool {
        self.swallow_click = false;
        let Some(id) = self.element_at(store, point) else {
            return false;
        };
        let Some(element) = store.template().and_then(|t| t.element(&id)) else {
            return false;
        };
        if !self.drag.begin(element, point) {
            return false;
        }
        if let Err(e) = store.select(&id) {
            tracing::debug!("Drag selection failed: {e}");
        }
        tracing::trace!("Drag started on {id}");
        true
    }

    /// Pointer moved. While dragging, writes the clamped position into the
    /// store and returns the applied update; otherwise does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the position update.
    pub fn pointer_move(
        &mut self,
        store: &mut EditorStore,
        point: Point,
    ) -> CoreResult<Option<PropertyUpdate>> {
        let Some(id) = self.drag.active_element().cloned() else {
            return Ok(None);
        };
        let Some(bounds) = store.template().and_then(|t| {
            t.element(&id).map(|e| DragBounds {
                canvas_width: t.width,
                canvas_height: t.height,
                element_width: e.transform.width,
                element_height: e.transform.height,
            })
        }) else {
            // Element vanished mid-drag (template swapped); abandon the drag.
            self.drag.end();
            return Ok(None);
        };

        let Some(position) = self.drag.update(point, self.layout.content_scale, bounds) else {
            return Ok(None);
        };
        let update = PropertyUpdate::Position {
            x: position.x,
            y: position.y,
        };
        store.apply(&id, &update)?;
        Ok(Some(update))
    }

    /// Pointer released. Ends any drag; a drag that moved the element
    /// swallows the click that follows.
    pub fn pointer_up(&mut self) {
        if let Some(session) = self.drag.end() {
            self.swallow_click = session.has_moved();
            tracing::trace!("Drag ended on {}", session.element);
        }
    }
}
