//! # StayFrame Core
//!
//! Template model and editor logic for the StayFrame canvas.
//! Everything here is renderer-agnostic; the export renderer and any UI
//! front end consume these types.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               stayframe-core                │
//! ├─────────────────────────────────────────────┤
//! │  Data Model      │  Editor                  │
//! │  - Templates     │  - Store + selection     │
//! │  - Elements      │  - Property edits        │
//! │  - Catalog       │  - Watermark lock        │
//! ├─────────────────────────────────────────────┤
//! │  Canvas View     │  Layout Engine           │
//! │  - Hit testing   │  - Scale-to-fit          │
//! │  - Drag-to-move  │  - Debounced resize      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod color;
pub mod debounce;
pub mod drag;
pub mod element;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod property;
pub mod store;
pub mod template;
pub mod view;

pub use catalog::{Catalog, WATERMARK_TEXT};
pub use color::Rgba;
pub use debounce::{Debouncer, Viewport, ViewportTracker, DEFAULT_RESIZE_DEBOUNCE};
pub use drag::{DragBounds, DragSession, DragState};
pub use element::{
    Element, ElementId, ElementKind, FontStyle, FontWeight, MediaSource, ObjectFit,
    PlaybackFlags, TextAlign, TextStyle, TextTransform, Transform, VideoSource,
};
pub use error::{CoreError, CoreResult};
pub use geometry::{Point, Rect};
pub use layout::{compute_layout, ContentLayout, FIT_RATIO, MIN_VISIBLE_SIZE};
pub use property::PropertyUpdate;
pub use store::{EditorSettings, EditorStore};
pub use template::{AppType, Template};
pub use view::{CanvasView, NodeBody, OverlayNode, ViewContent};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
