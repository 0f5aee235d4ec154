//! # StayFrame Renderer
//!
//! Headless export of StayFrame templates to bitmaps.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Preload    │──▶│  Background  │──▶│  Elements in │──▶│   Encode     │
//! │ assets+fonts │   │     fill     │   │  draw order  │   │ PNG/JPEG/WebP│
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Images are fetched concurrently and joined before anything is drawn;
//! a failed image is skipped rather than failing the export. Text is laid
//! out in template pixels and rasterized with fontdue at device
//! resolution. Compositing uses tiny-skia.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assets;
pub mod cache;
pub mod error;
pub mod export;
pub mod fit;
pub mod fonts;
pub mod surface;
pub mod text;

pub use assets::{AssetFetcher, AssetSource, DefaultFetcher};
pub use cache::{AssetCache, CacheStats};
pub use error::{RenderError, RenderResult};
pub use export::{
    export_template, resolve_size, ExportOptions, ExportRenderer, PreloadReport, RendererConfig,
    ResolvedSize, DEFAULT_USER_AGENT, VIDEO_LABEL,
};
pub use fit::Placement;
pub use fonts::{FontBook, FontConfig, FontRequest};
pub use surface::{Blob, ExportSurface, ImageFormat, DEFAULT_QUALITY};
pub use text::{TextLayout, TEXT_PADDING};
